//! The `trackplot` command line operations.
//!
//! Each command loads tracks, builds a headless [`TrackPlot`] with a
//! [`RecordingRenderer`] and writes part of the resulting layout as TSV.

use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{
    error::TrackPlotError,
    intervals::Interval,
    io::{read_bed_intervals, tracks_from_uniprot_file, OutputFile, BED_TSV},
    plot::{PlotConfig, TrackPlot, Viewport},
    render::{RecordingRenderer, TrackMarks},
    reporting::{CommandOutput, Report},
    tracks::{PointStyle, TrackConfig, TrackKind},
    traits::TsvSerialize,
    zoom::ZoomGesture,
};

/// Where the tracks of a plot come from.
#[derive(Clone, Debug, Default)]
pub struct TrackInputs {
    /// `(track name, BED path)` pairs, one track each.
    pub beds: Vec<(String, PathBuf)>,
    /// A UniProt JSON file, one track per feature type.
    pub uniprot: Option<PathBuf>,
    /// Keep only intervals on this sequence.
    pub chrom: Option<String>,
    /// Names of tracks to draw as points rather than spans.
    pub point_tracks: Vec<String>,
}

/// Parse a `NAME=PATH` track specification.
pub fn parse_track_spec(spec: &str) -> Result<(String, PathBuf), TrackPlotError> {
    match spec.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(TrackPlotError::InvalidTrackSpec(spec.to_string())),
    }
}

impl TrackInputs {
    /// Read every input, in order: BED files first, then UniProt tracks.
    pub fn load(&self) -> Result<Vec<(String, Vec<Interval>)>, TrackPlotError> {
        let chrom = self.chrom.as_deref();
        let mut tracks = Vec::new();
        for (name, path) in &self.beds {
            let intervals = read_bed_intervals(path, chrom)?;
            info!("read {} intervals from {}", intervals.len(), path.display());
            tracks.push((name.clone(), intervals));
        }
        if let Some(path) = &self.uniprot {
            for (name, intervals) in tracks_from_uniprot_file(path)? {
                let intervals = intervals
                    .into_iter()
                    .filter(|interval| chrom.map_or(true, |chrom| interval.chrom == chrom))
                    .collect();
                tracks.push((name, intervals));
            }
        }
        if tracks.is_empty() {
            return Err(TrackPlotError::NoTracks);
        }
        Ok(tracks)
    }

    /// Settings for the track `name`: those in `config`, drawn as points if
    /// listed in `point_tracks`.
    fn track_config(&self, name: &str, config: &PlotConfig) -> TrackConfig {
        let track_config = config.tracks.get(name).cloned().unwrap_or_default();
        let is_point = matches!(track_config.kind, Some(TrackKind::Point(_)));
        if !is_point && self.point_tracks.iter().any(|point| point == name) {
            track_config.kind(TrackKind::Point(PointStyle::default()))
        } else {
            track_config
        }
    }
}

/// Build a headless plot of all input tracks.
pub fn build_plot(
    inputs: &TrackInputs,
    config: PlotConfig,
    viewport: Viewport,
) -> Result<TrackPlot<RecordingRenderer>, TrackPlotError> {
    let tracks: Vec<(String, Vec<Interval>, TrackConfig)> = inputs
        .load()?
        .into_iter()
        .map(|(name, intervals)| {
            let track_config = inputs.track_config(&name, &config);
            (name, intervals, track_config)
        })
        .collect();
    let mut plot = TrackPlot::new(config, viewport, RecordingRenderer::default())?;
    plot.add_tracks(tracks)?;
    Ok(plot)
}

fn open_output(output: Option<&Path>, header: &str) -> std::io::Result<Box<dyn Write>> {
    let header = Some(vec![header.to_string()]);
    let output_stream = output.map_or(OutputFile::new_stdout(header.clone()), |file| {
        OutputFile::new(file, header)
    });
    output_stream.writer()
}

fn layout_report<R: crate::render::Renderer>(plot: &TrackPlot<R>) -> Report {
    plot.state()
        .layout
        .as_ref()
        .map(|layout| layout.report.clone())
        .unwrap_or_default()
}

/// Write one line per pocket: its genomic span, padded span and plot-index span.
pub fn trackplot_pockets(
    inputs: &TrackInputs,
    config: PlotConfig,
    output: Option<&Path>,
) -> Result<CommandOutput<()>, TrackPlotError> {
    let plot = build_plot(inputs, config, Viewport::default())?;
    let layout = plot.state().layout.as_ref().ok_or(TrackPlotError::EmptyInput)?;

    let mut writer = open_output(
        output,
        "chrom\tstart\tstop\tpadded_start\tpadded_stop\tplot_start\tplot_end",
    )?;
    let mut plot_start = 0;
    for ((pocket, padded), plot_end) in layout
        .pockets
        .iter()
        .zip(&layout.padded)
        .zip(layout.pocket_ends())
    {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            layout.seqname, pocket.start, pocket.stop, padded.0, padded.1, plot_start, plot_end
        )?;
        plot_start = plot_end;
    }
    writer.flush()?;
    Ok(CommandOutput::new((), layout_report(&plot)))
}

/// A zoom to apply before writing the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomRequest {
    pub k: f64,
    /// Pixel x kept fixed; the middle of the plot area if `None`.
    pub anchor: Option<f64>,
}

/// Write one line per interval: the interval, its plot span and pixel
/// geometry, optionally after zooming.
pub fn trackplot_layout(
    inputs: &TrackInputs,
    config: PlotConfig,
    viewport: Viewport,
    zoom: Option<ZoomRequest>,
    output: Option<&Path>,
) -> Result<CommandOutput<()>, TrackPlotError> {
    let mut plot = build_plot(inputs, config, viewport)?;
    if let Some(zoom) = zoom {
        plot.initialize_zoom();
        let anchor = zoom.anchor.map(|x| (x, viewport.height / 2.0));
        plot.zoomed(ZoomGesture::ScaleTo { k: zoom.k, anchor });
    }

    let state = plot.snapshot();
    let layout = state.layout.as_ref().ok_or(TrackPlotError::EmptyInput)?;
    let frame = plot.renderer().last().ok_or(TrackPlotError::NoTracks)?;

    let mut writer = open_output(
        output,
        "track\tchrom\tstart\tstop\tname\tstrand\tp_start\tp_stop\tx\twidth\ty\theight",
    )?;
    let none = &BED_TSV.no_value_string;
    for track in state.registry.iter() {
        let spans = layout.track_spans(&track.name).unwrap_or(&[]);
        let marks = frame.marks(&track.name);
        for (i, (interval, span)) in track.intervals.iter().zip(spans).enumerate() {
            let geometry = match marks {
                Some(TrackMarks::Spans(rects)) => rects.get(i).map(|rect| {
                    format!(
                        "{:.3}\t{:.3}\t{:.3}\t{:.3}",
                        rect.x, rect.width, rect.y, rect.height
                    )
                }),
                Some(TrackMarks::Points(points)) => points.get(i).map(|point| {
                    format!(
                        "{:.3}\t{}\t{:.3}\t{}",
                        point.x,
                        none,
                        point.y.unwrap_or(point.baseline),
                        none
                    )
                }),
                None => None,
            }
            .unwrap_or_else(|| vec![none.clone(); 4].join("\t"));
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                track.name,
                interval.to_tsv(&BED_TSV),
                span.p_start,
                span.p_stop,
                geometry
            )?;
        }
    }
    writer.flush()?;
    Ok(CommandOutput::new((), layout.report.clone()))
}

/// Write the coordinate maps: each plot index with its genomic and
/// feature-relative coordinate.
pub fn trackplot_coords(
    inputs: &TrackInputs,
    config: PlotConfig,
    output: Option<&Path>,
) -> Result<CommandOutput<()>, TrackPlotError> {
    let plot = build_plot(inputs, config, Viewport::default())?;
    let layout = plot.state().layout.as_ref().ok_or(TrackPlotError::EmptyInput)?;
    let maps = &layout.maps;

    let mut writer = open_output(output, "plot_index\tgenomic\tfeature")?;
    for (index, genomic) in maps.x_coords().iter().enumerate() {
        let feature = maps.feature(index).map(|f| f.to_string());
        writeln!(writer, "{}\t{}\t{}", index, genomic, feature.to_tsv(&BED_TSV))?;
    }
    writer.flush()?;
    Ok(CommandOutput::new((), layout_report(&plot)))
}

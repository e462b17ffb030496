//! The [`Renderer`] seam.
//!
//! The plot never draws anything itself. On every redraw it hands a
//! [`Frame`] to its renderer: the current state plus the x scale to draw with
//! (the base scale, or the zoom-rescaled one). The frame computes pixel
//! geometry (span rectangles, point positions, pocket marks, axis ticks) so
//! that renderers only have to put marks on a surface.

use crate::{
    plot::PlotState,
    pockets::{Layout, PlotSpan},
    scales::{LinearScale, Scales},
    tracks::{PointHeight, Track, TrackKind},
    zoom::ZoomTransform,
};

/// Half-height of span rectangles in a track's normalized `[-1, 1]` space.
pub const SPAN_HALF_HEIGHT: f64 = 0.5;

/// Ticks requested per axis.
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Whether a frame is a full redraw or a transient zoom/pan update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Full,
    Zoom,
}

/// A span rectangle in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanRect {
    /// Index of the interval within its track.
    pub interval: usize,
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
    pub label: Option<String>,
}

/// Where a point feature sits, in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PointMark {
    pub interval: usize,
    pub x: f64,
    /// Track baseline, where the stem starts.
    pub baseline: f64,
    /// `None` when the height is decided by the renderer (dodge, random).
    pub y: Option<f64>,
}

/// The marks of one track, by track kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackMarks {
    Spans(Vec<SpanRect>),
    Points(Vec<PointMark>),
}

/// A vertical line at the end of a pocket's padded span.
#[derive(Clone, Debug, PartialEq)]
pub struct PocketMark {
    /// Genomic stop of the pocket.
    pub genomic: crate::Position,
    pub plot_index: usize,
    pub x: f64,
    pub y1: f64,
    pub y2: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub plot_index: usize,
    pub x: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Everything needed to draw the plot once.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub state: &'a PlotState,
    pub layout: &'a Layout,
    pub scales: &'a Scales,
    /// The x scale to draw with.
    pub x: LinearScale,
    pub transform: ZoomTransform,
    pub kind: FrameKind,
}

impl<'a> Frame<'a> {
    /// `None` for an empty plot.
    pub fn new(
        state: &'a PlotState,
        x: LinearScale,
        transform: ZoomTransform,
        kind: FrameKind,
    ) -> Option<Self> {
        Some(Self {
            state,
            layout: state.layout.as_ref()?,
            scales: state.scales.as_ref()?,
            x,
            transform,
            kind,
        })
    }

    pub fn tracks(&self) -> &'a [Track] {
        self.state.registry.tracks()
    }

    /// Pixel extent of an inclusive plot span; degenerate spans still get
    /// one plot index of width.
    pub fn span_x(&self, span: &PlotSpan) -> (f64, f64) {
        let x0 = self.x.apply(span.p_start as f64);
        let x1 = self.x.apply((span.p_stop + 1) as f64);
        (x0, x1 - x0)
    }

    /// Marks for the track at `index` (in stacking order).
    pub fn track_marks(&self, index: usize) -> TrackMarks {
        let track = &self.tracks()[index];
        let y = &self.scales.ys[index];
        let spans = self.layout.track_spans(&track.name).unwrap_or(&[]);
        match track.kind {
            TrackKind::Span => {
                let top = y.apply(SPAN_HALF_HEIGHT);
                let height = (y.apply(-SPAN_HALF_HEIGHT) - top).abs();
                let rects = spans
                    .iter()
                    .zip(&track.intervals)
                    .enumerate()
                    .map(|(i, (span, interval))| {
                        let (x, width) = self.span_x(span);
                        let label = if self.state.config.add_interval_labels {
                            interval.feature_name.clone()
                        } else {
                            None
                        };
                        SpanRect {
                            interval: i,
                            x,
                            width,
                            y: top,
                            height,
                            label,
                        }
                    })
                    .collect();
                TrackMarks::Spans(rects)
            }
            TrackKind::Point(style) => {
                let baseline = y.apply(0.0);
                let height = match style.height {
                    PointHeight::Fixed(h) => Some(y.apply(h)),
                    PointHeight::Dodge | PointHeight::Random => None,
                };
                let points = spans
                    .iter()
                    .enumerate()
                    .map(|(i, span)| {
                        let (x, width) = self.span_x(span);
                        PointMark {
                            interval: i,
                            x: x + width / 2.0,
                            baseline,
                            y: height,
                        }
                    })
                    .collect();
                TrackMarks::Points(points)
            }
        }
    }

    pub fn all_track_marks(&self) -> Vec<TrackMarks> {
        (0..self.tracks().len()).map(|i| self.track_marks(i)).collect()
    }

    /// One mark per pocket, spanning from the top of the first track to the
    /// bottom of the last.
    pub fn pocket_marks(&self) -> Vec<PocketMark> {
        let ys = &self.scales.ys;
        let (top, bottom) = match (ys.first(), ys.last()) {
            (Some(first), Some(last)) => (first.apply(0.5), last.apply(-0.5)),
            _ => return Vec::new(),
        };
        self.layout
            .pockets
            .iter()
            .zip(self.layout.pocket_ends())
            .map(|(pocket, end)| PocketMark {
                genomic: pocket.stop,
                plot_index: end,
                x: self.x.apply(end as f64),
                y1: top,
                y2: bottom,
            })
            .collect()
    }

    /// Integer plot-index ticks over the visible domain, labelled by `label`.
    fn ticks_with<F>(&self, count: usize, label: F) -> Vec<Tick>
    where
        F: Fn(usize) -> Option<String>,
    {
        self.x
            .ticks(count)
            .into_iter()
            .filter(|t| *t >= 0.0 && t.fract() == 0.0)
            .filter_map(|t| {
                let plot_index = t as usize;
                label(plot_index).map(|label| Tick {
                    plot_index,
                    x: self.x.apply(t),
                    label,
                })
            })
            .collect()
    }

    /// Bottom axis: genomic coordinates, as `g.<position>`.
    pub fn genomic_ticks(&self, count: usize) -> Vec<Tick> {
        let maps = &self.layout.maps;
        self.ticks_with(count, |i| maps.genomic(i).map(|g| format!("g.{}", g)))
    }

    /// Top axis: feature-relative coordinates along the coordinate track.
    pub fn feature_ticks(&self, count: usize) -> Vec<Tick> {
        let maps = &self.layout.maps;
        self.ticks_with(count, |i| maps.feature(i).map(|f| f.to_string()))
    }

    /// Track names at the top left of each band, if enabled.
    pub fn track_labels(&self) -> Vec<TrackLabel> {
        if !self.state.config.add_track_labels {
            return Vec::new();
        }
        self.tracks()
            .iter()
            .zip(&self.scales.ys)
            .map(|(track, y)| TrackLabel {
                text: track.name.clone(),
                x: self.state.config.margin_left,
                y: y.apply(1.0),
            })
            .collect()
    }
}

/// Something that can draw a [`Frame`].
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);
    /// Drop anything held for the track `name`.
    fn release_track(&mut self, _name: &str) {}
    /// Remove everything drawn so far.
    fn clear(&mut self) {}
}

/// Draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) {}
}

/// The pixel geometry of one rendered frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub kind: FrameKind,
    pub transform: ZoomTransform,
    pub x: LinearScale,
    pub ys: Vec<LinearScale>,
    pub tracks: Vec<(String, TrackMarks)>,
    pub pockets: Vec<PocketMark>,
    pub genomic_ticks: Vec<Tick>,
    pub feature_ticks: Vec<Tick>,
    pub labels: Vec<TrackLabel>,
}

impl FrameRecord {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        Self {
            kind: frame.kind,
            transform: frame.transform,
            x: frame.x,
            ys: frame.scales.ys.clone(),
            tracks: frame
                .tracks()
                .iter()
                .map(|track| track.name.clone())
                .zip(frame.all_track_marks())
                .collect(),
            pockets: frame.pocket_marks(),
            genomic_ticks: frame.genomic_ticks(DEFAULT_TICK_COUNT),
            feature_ticks: frame.feature_ticks(DEFAULT_TICK_COUNT),
            labels: frame.track_labels(),
        }
    }

    pub fn marks(&self, track: &str) -> Option<&TrackMarks> {
        self.tracks
            .iter()
            .find(|(name, _)| name == track)
            .map(|(_, marks)| marks)
    }
}

/// Keeps the geometry of every frame it is given. Useful for headless
/// output and for tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<FrameRecord>,
    pub released: Vec<String>,
    pub clears: usize,
}

impl RecordingRenderer {
    pub fn last(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        self.frames.push(FrameRecord::from_frame(frame));
    }

    fn release_track(&mut self, name: &str) {
        self.released.push(name.to_string());
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::Interval;
    use crate::plot::{PlotConfig, TrackPlot, Viewport};
    use crate::tracks::{PointStyle, TrackConfig};
    use crate::zoom::ZoomGesture;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn plot(config: PlotConfig) -> TrackPlot<RecordingRenderer> {
        TrackPlot::new(config, Viewport::new(840.0, 400.0), RecordingRenderer::default()).unwrap()
    }

    fn no_padding() -> PlotConfig {
        PlotConfig {
            gap_padding: 0,
            max_pocket_gap: 2,
            ..PlotConfig::default()
        }
    }

    #[test]
    fn test_span_rects() {
        let mut plot = plot(no_padding());
        let intervals = vec![Interval::new("chr1", 0, 10), Interval::new("chr1", 15, 20)];
        plot.add_track("a", intervals, TrackConfig::new()).unwrap();
        let frame = plot.renderer().last().unwrap();
        // two pockets of 10 and 5 positions: 15 plot indices over 760 px
        let px = 760.0 / 15.0;
        match frame.marks("a").unwrap() {
            TrackMarks::Spans(rects) => {
                assert_eq!(rects.len(), 2);
                assert!(close(rects[0].x, 40.0));
                assert!(close(rects[0].width, 10.0 * px));
                assert!(close(rects[1].x, 40.0 + 10.0 * px));
                assert!(close(rects[1].width, 5.0 * px));
                // one track: band 40..360, half height 0.5 → 120..280
                assert!(close(rects[0].y, 120.0));
                assert!(close(rects[0].height, 160.0));
                assert_eq!(rects[0].label, None);
            }
            _ => panic!("expected spans"),
        }
    }

    #[test]
    fn test_interval_labels() {
        let config = PlotConfig {
            add_interval_labels: true,
            add_track_labels: true,
            ..no_padding()
        };
        let mut plot = plot(config);
        let intervals = vec![Interval::new("chr1", 0, 10).with_name("exon1")];
        plot.add_track("a", intervals, TrackConfig::new()).unwrap();
        let frame = plot.renderer().last().unwrap();
        match frame.marks("a").unwrap() {
            TrackMarks::Spans(rects) => assert_eq!(rects[0].label.as_deref(), Some("exon1")),
            _ => panic!("expected spans"),
        }
        assert_eq!(frame.labels.len(), 1);
        assert_eq!(frame.labels[0].text, "a");
        assert!(close(frame.labels[0].y, 40.0));
    }

    #[test]
    fn test_point_marks() {
        let mut plot = plot(no_padding());
        plot.add_track("a", vec![Interval::new("chr1", 0, 10)], TrackConfig::new())
            .unwrap();
        let sites = vec![Interval::new("chr1", 4, 4)];
        let style = PointStyle {
            height: PointHeight::Fixed(0.5),
            ..PointStyle::default()
        };
        plot.add_track("snps", sites, TrackConfig::new().kind(TrackKind::Point(style)))
            .unwrap();
        let frame = plot.renderer().last().unwrap();
        let px = 760.0 / 10.0;
        match frame.marks("snps").unwrap() {
            TrackMarks::Points(points) => {
                assert_eq!(points.len(), 1);
                assert!(close(points[0].x, 40.0 + 4.5 * px));
                // second band 200..360
                assert!(close(points[0].baseline, 280.0));
                assert!(close(points[0].y.unwrap(), 240.0));
            }
            _ => panic!("expected points"),
        }
    }

    #[test]
    fn test_pocket_marks_follow_zoom() {
        let mut plot = plot(no_padding());
        let intervals = vec![Interval::new("chr1", 0, 10), Interval::new("chr1", 15, 20)];
        plot.add_track("a", intervals, TrackConfig::new()).unwrap();
        plot.initialize_zoom();

        let base = plot.renderer().last().unwrap().clone();
        assert_eq!(base.pockets.len(), 2);
        assert_eq!(base.pockets[0].plot_index, 10);
        assert_eq!(base.pockets[0].genomic, 10);
        assert!(close(base.pockets[1].x, 800.0));
        assert!(close(base.pockets[0].y1, 120.0));
        assert!(close(base.pockets[0].y2, 280.0));

        let anchor = base.x.apply(5.0);
        plot.zoomed(ZoomGesture::ScaleTo {
            k: 2.0,
            anchor: Some((anchor, 0.0)),
        });
        let zoomed = plot.renderer().last().unwrap();
        assert_eq!(zoomed.kind, FrameKind::Zoom);
        for (before, after) in base.pockets.iter().zip(&zoomed.pockets) {
            let p = before.plot_index as f64;
            let expected = base.x.apply(5.0) + 2.0 * (base.x.apply(p) - base.x.apply(5.0));
            assert!(close(after.x, expected));
        }
    }

    #[test]
    fn test_axis_ticks() {
        let mut plot = plot(no_padding());
        let intervals = vec![Interval::new("chr1", 100, 110)];
        plot.add_track("a", intervals, TrackConfig::new()).unwrap();
        let frame = plot.renderer().last().unwrap();
        let labels: Vec<&str> = frame.genomic_ticks.iter().map(|t| t.label.as_str()).collect();
        // plot indices 0..=10, index 10 is past the end of x_coords
        assert_eq!(labels[0], "g.100");
        assert_eq!(labels.last(), Some(&"g.109"));
        assert_eq!(frame.feature_ticks.first().unwrap().label, "0");
        assert_eq!(frame.feature_ticks.last().unwrap().label, "9");
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use trackplot::{
    commands::{
        parse_track_spec, trackplot_coords, trackplot_layout, trackplot_pockets, TrackInputs,
        ZoomRequest,
    },
    plot::{PlotConfig, Viewport},
    prelude::TrackPlotError,
    Position,
};

const INFO: &str = "\
trackplot: lay out sparse genomic intervals as a stitched multi-track plot
usage: trackplot [--help] <subcommand>

Subcommands:

  pockets: print the pockets (clusters of nearby intervals) and their plot-index spans.
  layout:  print every interval's plot span and pixel geometry.
  coords:  print the plot index to genomic and feature coordinate maps.

";

#[derive(Parser)]
#[clap(name = "trackplot")]
#[clap(about = INFO)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Track inputs shared by every subcommand.
#[derive(Args)]
struct InputArgs {
    /// a BED track as NAME=PATH (repeatable; plain or gzip-compressed)
    #[arg(long = "bed", value_name = "NAME=PATH")]
    beds: Vec<String>,

    /// a UniProt JSON file; each feature type becomes a track
    #[arg(long)]
    uniprot: Option<PathBuf>,

    /// only keep intervals on this sequence
    #[arg(long)]
    chrom: Option<String>,

    /// draw the named track as points instead of spans (repeatable)
    #[arg(long = "points", value_name = "NAME")]
    point_tracks: Vec<String>,
}

impl InputArgs {
    fn track_inputs(&self) -> Result<TrackInputs, TrackPlotError> {
        let beds = self
            .beds
            .iter()
            .map(|spec| parse_track_spec(spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrackInputs {
            beds,
            uniprot: self.uniprot.clone(),
            chrom: self.chrom.clone(),
            point_tracks: self.point_tracks.clone(),
        })
    }
}

/// Plot settings; flags override values from `--config`.
#[derive(Args)]
struct ConfigArgs {
    /// a JSON plot configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// largest gap (in basepairs) between intervals in the same pocket
    #[arg(long)]
    max_pocket_gap: Option<Position>,

    /// basepairs of padding drawn on each side of a pocket
    #[arg(long)]
    gap_padding: Option<Position>,

    /// index of the track feature coordinates are counted along
    #[arg(long)]
    coordinate_track: Option<usize>,

    #[arg(long)]
    margin_left: Option<f64>,
    #[arg(long)]
    margin_right: Option<f64>,
    #[arg(long)]
    margin_top: Option<f64>,
    #[arg(long)]
    margin_bottom: Option<f64>,

    /// label each track with its name
    #[arg(long)]
    track_labels: bool,

    /// label each interval with its feature name
    #[arg(long)]
    interval_labels: bool,

    /// smallest zoom scale
    #[arg(long)]
    min_scale: Option<f64>,

    /// largest zoom scale
    #[arg(long)]
    max_scale: Option<f64>,
}

impl ConfigArgs {
    fn plot_config(&self) -> Result<PlotConfig, TrackPlotError> {
        let mut config = match &self.config {
            Some(path) => PlotConfig::from_json_file(path)?,
            None => PlotConfig::default(),
        };
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }
        set!(
            max_pocket_gap,
            gap_padding,
            coordinate_track,
            margin_left,
            margin_right,
            margin_top,
            margin_bottom,
            min_scale,
            max_scale
        );
        config.add_track_labels |= self.track_labels;
        config.add_interval_labels |= self.interval_labels;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pockets as TSV
    Pockets {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print per-interval plot spans and pixel geometry as TSV
    Layout {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// plot width in pixels
        #[arg(long, default_value_t = 960.0)]
        width: f64,

        /// plot height in pixels
        #[arg(long, default_value_t = 500.0)]
        height: f64,

        /// zoom scale to apply before computing pixel geometry
        #[arg(long)]
        zoom: Option<f64>,

        /// pixel x to zoom about (default: centre of the plot area)
        #[arg(long, requires = "zoom")]
        anchor: Option<f64>,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the coordinate maps as TSV
    Coords {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn run() -> Result<(), TrackPlotError> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let result = match &cli.command {
        Some(Commands::Pockets {
            inputs,
            config,
            output,
        }) => trackplot_pockets(
            &inputs.track_inputs()?,
            config.plot_config()?,
            output.as_deref(),
        ),
        Some(Commands::Layout {
            inputs,
            config,
            width,
            height,
            zoom,
            anchor,
            output,
        }) => {
            let zoom = zoom.map(|k| ZoomRequest { k, anchor: *anchor });
            trackplot_layout(
                &inputs.track_inputs()?,
                config.plot_config()?,
                Viewport::new(*width, *height),
                zoom,
                output.as_deref(),
            )
        }
        Some(Commands::Coords {
            inputs,
            config,
            output,
        }) => trackplot_coords(
            &inputs.track_inputs()?,
            config.plot_config()?,
            output.as_deref(),
        ),
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    };
    let output = result?;
    for issue in output.report.issues() {
        eprintln!("Warning: {}", issue);
    }
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

//! # trackplot
//!
//! The coordinate engine behind a zoomable, stitched multi-track genomic plot.
//!
//! Sparse intervals from any number of tracks are collapsed into *pockets*
//! (clusters of nearby intervals) laid end to end in a dense *plot-index*
//! space. Bidirectional maps connect genomic coordinates, plot indices and
//! feature-relative coordinates, and linear scales carry plot indices to
//! pixels. Drawing is left to a [`Renderer`](render::Renderer).

pub mod commands;
pub mod error;
pub mod intervals;
pub mod io;
pub mod plot;
pub mod pockets;
pub mod render;
pub mod reporting;
pub mod scales;
pub mod test_utilities;
pub mod tracks;
pub mod traits;
pub mod zoom;

#[cfg(not(feature = "big-position"))]
pub type Position = u32;

#[cfg(feature = "big-position")]
pub type Position = u64;

pub mod prelude {
    pub use crate::error::TrackPlotError;
    pub use crate::intervals::{Interval, Strand};
    pub use crate::io::parsers::{read_bed_intervals, tracks_from_uniprot_json, BedIterator};
    pub use crate::plot::{PlotConfig, PlotState, TrackPlot, Viewport};
    pub use crate::pockets::{recalculate_pockets, CoordinateMaps, Layout, PlotSpan, Pocket};
    pub use crate::render::{Frame, NullRenderer, RecordingRenderer, Renderer};
    pub use crate::scales::{update_x, update_ys, LinearScale, Scales};
    pub use crate::tracks::{PointStyle, Track, TrackConfig, TrackKind, TrackRegistry};
    pub use crate::zoom::{ZoomController, ZoomGesture, ZoomTransform};
}

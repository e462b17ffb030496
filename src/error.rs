//! The [`TrackPlotError`] `enum` definition and error messages.
//!
use crate::Position;
use std::num::ParseIntError;
use thiserror::Error;

/// The [`TrackPlotError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum TrackPlotError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TSV reading error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // File parsing related errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("BED file has too few columns ({found}). The first three columns must be sequence name, and start and end positions.\nLine {line}")]
    BedTooFewColumns { line: usize, found: usize },
    #[error("Column had type '{found_value}' but expected '{expected_type}' (line {line})")]
    InvalidColumnType {
        expected_type: String,
        found_value: String,
        line: usize,
    },
    #[error("Invalid BED strand '{0}': must be either '+', '-', or '.'")]
    InvalidStrand(String),
    #[error("UniProt JSON is invalid: {0}")]
    InvalidUniprotJson(String),
    #[error("Track specification '{0}' is invalid: expected NAME=PATH")]
    InvalidTrackSpec(String),

    // Interval and track validation errors
    #[error("Interval {index} of track '{track}' is malformed: {reason}")]
    MalformedInterval {
        track: String,
        index: usize,
        reason: String,
    },
    #[error("Interval [{0}, {1}) is invalid: stop must be greater than start")]
    InvalidInterval(Position, Position),
    #[error("Plot configuration is invalid: {0}")]
    InvalidConfig(String),
    #[error("Track configuration is invalid: {0}")]
    InvalidTrackConfig(String),

    // Track registry errors
    #[error("A track named '{0}' is already registered")]
    DuplicateTrackName(String),
    #[error("No track named '{0}' is registered")]
    TrackNotFound(String),

    // Layout errors
    #[error("No intervals available to build pockets from")]
    EmptyInput,
    #[error("Scales cannot be computed without tracks")]
    NoTracks,
    #[error("Intervals span more than one sequence ('{0}' and '{1}'); multi-contig plots are not supported")]
    MultipleSequences(String, String),

    // Command line tool related errors
    #[error("Command line argument error: {0}")]
    ArgumentError(#[from] clap::error::Error),
}

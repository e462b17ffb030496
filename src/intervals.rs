//! Genomic intervals, the input records of every track.
//!
//! Coordinates follow the BED convention: 0-based and half-open, so an
//! interval `[start, stop)` covers `stop - start` positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{error::TrackPlotError, io::tsv::TsvConfig, traits::GenericRange, traits::TsvSerialize, Position};

/// Nucleotide strand enum type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
    #[default]
    #[serde(rename = ".")]
    Unknown,
}

impl FromStr for Strand {
    type Err = TrackPlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            other => Err(TrackPlotError::InvalidStrand(other.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{}", symbol)
    }
}

/// A single genomic feature, e.g. one BED line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub chrom: String,
    pub start: Position,
    pub stop: Position,
    pub feature_name: Option<String>,
    pub strand: Strand,
}

impl Interval {
    /// Create a new 0-indexed right-exclusive interval with no name and an
    /// unknown strand. No validation happens here; see [`validate_intervals()`].
    pub fn new(chrom: impl Into<String>, start: Position, stop: Position) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            stop,
            feature_name: None,
            strand: Strand::Unknown,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.feature_name = Some(name.into());
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }
}

impl GenericRange for Interval {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.stop
    }
}

impl TsvSerialize for Interval {
    fn to_tsv(&self, config: &TsvConfig) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.start,
            self.stop,
            self.feature_name.to_tsv(config),
            self.strand
        )
    }
}

/// Validates the intervals of a track named `track`.
///
/// Every interval needs a sequence name and `stop > start`. Zero-width
/// intervals are tolerated only when `allow_degenerate` is set (point tracks,
/// where an interval marks a single site). The error names the offending
/// interval by its index in `intervals`.
pub fn validate_intervals(
    track: &str,
    intervals: &[Interval],
    allow_degenerate: bool,
) -> Result<(), TrackPlotError> {
    for (index, interval) in intervals.iter().enumerate() {
        let malformed = |reason: String| TrackPlotError::MalformedInterval {
            track: track.to_string(),
            index,
            reason,
        };
        if interval.chrom.is_empty() {
            return Err(malformed("missing sequence name".to_string()));
        }
        if interval.stop < interval.start
            || (interval.stop == interval.start && !allow_degenerate)
        {
            return Err(malformed(
                TrackPlotError::InvalidInterval(interval.start, interval.stop).to_string(),
            ));
        }
    }
    Ok(())
}

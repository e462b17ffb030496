//! UniProt feature JSON.
//!
//! A UniProt entry lists its sequence features, each with a `type` (e.g.
//! "Domain", "Helix"), a `location` and an optional `description`. Features
//! become one track per type, in the order types are first seen. Locations
//! are 1-based and inclusive; they are converted to 0-based half-open
//! intervals on the pseudo-sequence [`UNIPROT_CHROM`].

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

use crate::{
    error::TrackPlotError,
    intervals::{Interval, Strand},
    io::InputFile,
    Position,
};

/// Sequence name given to every UniProt interval.
pub const UNIPROT_CHROM: &str = "CODING_GENE";

#[derive(Debug, Deserialize)]
struct UniprotEntry {
    features: Vec<UniprotFeature>,
}

#[derive(Debug, Deserialize)]
struct UniprotFeature {
    #[serde(rename = "type")]
    feature_type: String,
    location: UniprotLocation,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UniprotLocation {
    start: UniprotPosition,
    end: UniprotPosition,
}

#[derive(Debug, Deserialize)]
struct UniprotPosition {
    value: Option<Position>,
}

impl UniprotFeature {
    fn to_interval(&self, index: usize) -> Result<Interval, TrackPlotError> {
        let invalid = |what: &str| {
            TrackPlotError::InvalidUniprotJson(format!(
                "feature {} ({}) has {}",
                index, self.feature_type, what
            ))
        };
        let start = self
            .location
            .start
            .value
            .ok_or_else(|| invalid("no start position"))?;
        let end = self
            .location
            .end
            .value
            .ok_or_else(|| invalid("no end position"))?;
        if start == 0 || end < start {
            return Err(invalid("an invalid location"));
        }
        let mut interval = Interval::new(UNIPROT_CHROM, start - 1, end).with_strand(Strand::Forward);
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            interval = interval.with_name(description);
        }
        Ok(interval)
    }
}

/// Parse UniProt JSON into `(track name, intervals)` pairs, one per feature type.
pub fn tracks_from_uniprot_json(json: &str) -> Result<Vec<(String, Vec<Interval>)>, TrackPlotError> {
    let entry: UniprotEntry = serde_json::from_str(json)?;
    let mut tracks: IndexMap<String, Vec<Interval>> = IndexMap::new();
    for (index, feature) in entry.features.iter().enumerate() {
        let interval = feature.to_interval(index)?;
        tracks
            .entry(feature.feature_type.clone())
            .or_default()
            .push(interval);
    }
    debug!(
        "{} UniProt features in {} feature types",
        entry.features.len(),
        tracks.len()
    );
    Ok(tracks.into_iter().collect())
}

/// Read a (possibly gzip-compressed) UniProt JSON file.
pub fn tracks_from_uniprot_file(
    filepath: impl Into<PathBuf>,
) -> Result<Vec<(String, Vec<Interval>)>, TrackPlotError> {
    let contents = InputFile::new(filepath).read_to_string()?;
    tracks_from_uniprot_json(&contents)
}

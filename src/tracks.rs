//! Tracks and the [`TrackRegistry`].
//!
//! A [`Track`] is a named, ordered set of intervals plus the display
//! configuration that decides where (vertically) and how it is drawn. The
//! registry keeps tracks unique by name and stacked by `y_order`.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::TrackPlotError,
    intervals::{validate_intervals, Interval},
};

pub const DEFAULT_COLOUR: &str = "steelblue";

/// Shape used to draw a point feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointShape {
    #[default]
    Circle,
    Square,
    Star,
    Flower,
    Rose,
}

/// Where a point sits within its track's normalized `[-1, 1]` height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointHeight {
    Fixed(f64),
    /// Offset to avoid overlaps with neighbouring points.
    Dodge,
    Random,
}

impl Default for PointHeight {
    fn default() -> Self {
        PointHeight::Fixed(0.0)
    }
}

/// The stem joining a point to its track baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StemStyle {
    #[default]
    Line,
    Curve,
    RandomCurve,
}

/// Display options for point (variant) tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    pub shape: PointShape,
    pub height: PointHeight,
    pub stem: StemStyle,
}

/// What kind of features a track holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrackKind {
    /// Intervals drawn as spanning rectangles.
    #[default]
    Span,
    /// Single sites drawn as points on stems.
    Point(PointStyle),
}

impl TrackKind {
    pub fn allows_degenerate(&self) -> bool {
        matches!(self, TrackKind::Point(_))
    }
}

/// Optional per-track settings; anything left as `None` takes the default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub kind: Option<TrackKind>,
    pub colour: Option<String>,
    pub y_fraction: Option<f64>,
    pub y_order: Option<i32>,
}

impl TrackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: TrackKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }

    pub fn y_fraction(mut self, y_fraction: f64) -> Self {
        self.y_fraction = Some(y_fraction);
        self
    }

    pub fn y_order(mut self, y_order: i32) -> Self {
        self.y_order = Some(y_order);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub name: String,
    pub intervals: Vec<Interval>,
    pub kind: TrackKind,
    pub colour: String,
    /// Relative vertical weight, always > 0.
    pub y_fraction: f64,
    /// Stacking order, smallest on top.
    pub y_order: i32,
}

impl Track {
    /// Build a track, merging `config` over the defaults (span, steelblue,
    /// `y_fraction = 1`, `y_order = 1`) and validating its intervals.
    pub fn new(
        name: impl Into<String>,
        intervals: Vec<Interval>,
        config: TrackConfig,
    ) -> Result<Self, TrackPlotError> {
        let name = name.into();
        let kind = config.kind.unwrap_or_default();
        let y_fraction = config.y_fraction.unwrap_or(1.0);
        if !(y_fraction.is_finite() && y_fraction > 0.0) {
            return Err(TrackPlotError::InvalidTrackConfig(format!(
                "track '{}' has y_fraction {}, which must be a positive number",
                name, y_fraction
            )));
        }
        if let TrackKind::Point(PointStyle {
            height: PointHeight::Fixed(height),
            ..
        }) = kind
        {
            if !(-1.0..=1.0).contains(&height) {
                return Err(TrackPlotError::InvalidTrackConfig(format!(
                    "track '{}' has point height {}, which must be within [-1, 1]",
                    name, height
                )));
            }
        }
        validate_intervals(&name, &intervals, kind.allows_degenerate())?;
        Ok(Self {
            name,
            intervals,
            kind,
            colour: config.colour.unwrap_or_else(|| DEFAULT_COLOUR.to_string()),
            y_fraction,
            y_order: config.y_order.unwrap_or(1),
        })
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Ordered collection of tracks keyed by unique name.
///
/// Tracks are kept sorted by `y_order`; ties keep insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new track. Fails if the name is taken or the track is invalid;
    /// the registry is unchanged on failure.
    pub fn add_track(
        &mut self,
        name: &str,
        intervals: Vec<Interval>,
        config: TrackConfig,
    ) -> Result<(), TrackPlotError> {
        if self.contains(name) {
            return Err(TrackPlotError::DuplicateTrackName(name.to_string()));
        }
        let track = Track::new(name, intervals, config)?;
        info!(
            "registered track '{}' ({} intervals, y_order {})",
            track.name,
            track.len(),
            track.y_order
        );
        self.tracks.push(track);
        // sort_by_key is stable, so equal y_order keeps insertion order
        self.tracks.sort_by_key(|track| track.y_order);
        Ok(())
    }

    /// Remove and return the track called `name`.
    pub fn remove_track(&mut self, name: &str) -> Result<Track, TrackPlotError> {
        let position = self
            .tracks
            .iter()
            .position(|track| track.name == name)
            .ok_or_else(|| TrackPlotError::TrackNotFound(name.to_string()))?;
        let track = self.tracks.remove(position);
        info!("removed track '{}'", track.name);
        Ok(track)
    }

    pub fn get(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn names(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

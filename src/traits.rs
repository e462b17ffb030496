//! Traits used by the trackplot library.
//!

use crate::{io::tsv::TsvConfig, Position};

/// The [`GenericRange`] trait defines common functionality for all range types.
///
/// Ranges are 0-indexed and right-exclusive, as in BED.
pub trait GenericRange {
    fn start(&self) -> Position;
    fn end(&self) -> Position;
    fn width(&self) -> Position {
        self.end().saturating_sub(self.start())
    }
    /// Whether the range covers no positions at all (`start >= end`).
    fn is_degenerate(&self) -> bool {
        self.end() <= self.start()
    }
    /// The end used when laying this range out: degenerate ranges still
    /// occupy a single position.
    fn occupied_end(&self) -> Position {
        self.end().max(self.start().saturating_add(1))
    }
}

impl<R: GenericRange> GenericRange for &R {
    fn start(&self) -> Position {
        (*self).start()
    }
    fn end(&self) -> Position {
        (*self).end()
    }
}

/// Defines how to serialize something to TSV.
pub trait TsvSerialize {
    // Serialize something to a TSV [`String`].
    fn to_tsv(&self, config: &TsvConfig) -> String;
}

impl TsvSerialize for String {
    #![allow(unused_variables)]
    fn to_tsv(&self, config: &TsvConfig) -> String {
        self.to_string()
    }
}

impl TsvSerialize for Option<String> {
    fn to_tsv(&self, config: &TsvConfig) -> String {
        self.as_ref()
            .map_or(config.no_value_string.clone(), |x| x.to_tsv(config))
    }
}

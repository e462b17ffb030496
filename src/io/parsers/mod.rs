//! Parsers turning input files into [`Interval`](crate::intervals::Interval)s
//! and tracks.
//!
//! Two formats are supported:
//!
//!  - BED (and BED-like TSV), via [`BedIterator`]: one track per file.
//!  - UniProt feature JSON, via [`tracks_from_uniprot_json()`]: one track per
//!    feature type.
//!
//! Both detect gzip compression from the file contents.

pub mod bed;
pub mod uniprot;

use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::PathBuf;

use crate::error::TrackPlotError;
use crate::io::InputFile;

pub use bed::{read_bed_intervals, BedIterator};
pub use uniprot::{tracks_from_uniprot_file, tracks_from_uniprot_json, UNIPROT_CHROM};

/// Build a TSV reader which ignores comment lines, works on gzip-compressed
/// files, and allows rows with differing numbers of columns.
pub fn build_tsv_reader(filepath: impl Into<PathBuf>) -> Result<Reader<Box<dyn Read>>, TrackPlotError> {
    let stream = InputFile::new(filepath).reader()?;
    let stream: Box<dyn Read> = Box::new(stream);
    let reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(stream);
    Ok(reader)
}

/// Parses a single column value into a specified type.
///
/// # Arguments
///
/// * `column`: The string slice of the column to parse.
/// * `line`: The line number the column came from, for error reporting.
///
/// # Errors
///
/// Returns `TrackPlotError::InvalidColumnType` if the column cannot be parsed into type `T`.
pub fn parse_column<T: std::str::FromStr>(column: &str, line: usize) -> Result<T, TrackPlotError>
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    column
        .parse::<T>()
        .map_err(|_| TrackPlotError::InvalidColumnType {
            expected_type: std::any::type_name::<T>().to_string(),
            found_value: column.to_string(),
            line,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn test_parse_column() {
        let value: Position = parse_column("42", 3).unwrap();
        assert_eq!(value, 42);
        let result: Result<Position, _> = parse_column("4x2", 3);
        assert!(matches!(
            result,
            Err(TrackPlotError::InvalidColumnType { line: 3, .. })
        ));
    }
}

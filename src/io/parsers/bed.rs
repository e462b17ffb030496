//! BED parsing.
//!
//! The BED (Browser Extensible Format) is a TSV format in bioinformatics.
//! It has a fairly strict [specification](https://samtools.github.io/hts-specs/BEDv1.pdf),
//! but in practice it is quite permissive, so only the first three columns
//! are required here. The feature name (column 4) and strand (column 6) are
//! read when present; everything else is ignored.

use csv::{StringRecord, StringRecordsIntoIter};
use std::io::Read;
use std::path::PathBuf;

use crate::{
    error::TrackPlotError,
    intervals::{Interval, Strand},
    Position,
};

use super::{build_tsv_reader, parse_column};

const NAME_COLUMN: usize = 3;
const STRAND_COLUMN: usize = 5;

/// An iterator over the [`Interval`]s of a BED file.
pub struct BedIterator {
    records: StringRecordsIntoIter<Box<dyn Read>>,
}

impl std::fmt::Debug for BedIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedIterator").finish_non_exhaustive()
    }
}

impl BedIterator {
    /// Creates a parsing iterator over a (possibly gzip-compressed) BED file.
    /// Lines starting with `#` are skipped.
    pub fn new(filepath: impl Into<PathBuf>) -> Result<Self, TrackPlotError> {
        let reader = build_tsv_reader(filepath)?;
        Ok(Self {
            records: reader.into_records(),
        })
    }
}

impl Iterator for BedIterator {
    type Item = Result<Interval, TrackPlotError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|result| {
            let record = result?;
            parse_bed_record(&record)
        })
    }
}

/// A missing optional column, either empty or the BED placeholder `.`.
fn optional_column<'a>(record: &'a StringRecord, index: usize) -> Option<&'a str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != ".")
}

/// Parse one BED record into an [`Interval`].
pub fn parse_bed_record(record: &StringRecord) -> Result<Interval, TrackPlotError> {
    let line = record.position().map_or(0, |position| position.line() as usize);
    if record.len() < 3 {
        return Err(TrackPlotError::BedTooFewColumns {
            line,
            found: record.len(),
        });
    }

    let start: Position = parse_column(record[1].trim(), line)?;
    let stop: Position = parse_column(record[2].trim(), line)?;
    let mut interval = Interval::new(&record[0], start, stop);
    if let Some(name) = optional_column(record, NAME_COLUMN) {
        interval = interval.with_name(name);
    }
    if let Some(strand) = optional_column(record, STRAND_COLUMN) {
        interval = interval.with_strand(strand.parse::<Strand>()?);
    }
    Ok(interval)
}

/// Read all intervals of a BED file, keeping only those on `chrom` if given.
pub fn read_bed_intervals(
    filepath: impl Into<PathBuf>,
    chrom: Option<&str>,
) -> Result<Vec<Interval>, TrackPlotError> {
    let mut intervals = Vec::new();
    for result in BedIterator::new(filepath)? {
        let interval = result?;
        if chrom.map_or(true, |chrom| interval.chrom == chrom) {
            intervals.push(interval);
        }
    }
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{bedfile_from, random_bedfile, temp_bedfile};
    use std::io::Write;

    fn bedfile(contents: &str) -> tempfile::NamedTempFile {
        let mut file = temp_bedfile();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_bed3_and_bed6() {
        let file = bedfile("# comment\nchr1\t10\t20\nchr1\t30\t45\texon2\t0\t-\n");
        let intervals = read_bed_intervals(file.path(), None).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0], Interval::new("chr1", 10, 20));
        assert_eq!(intervals[1].feature_name.as_deref(), Some("exon2"));
        assert_eq!(intervals[1].strand, Strand::Reverse);
    }

    #[test]
    fn test_bed4_name_only() {
        let file = bedfile("chr1\t0\t5\tpromoter\n");
        let intervals = read_bed_intervals(file.path(), None).unwrap();
        assert_eq!(intervals[0].feature_name.as_deref(), Some("promoter"));
        assert_eq!(intervals[0].strand, Strand::Unknown);
    }

    #[test]
    fn test_too_few_columns() {
        let file = bedfile("chr1\t10\t20\nchr1\t30\n");
        let result = read_bed_intervals(file.path(), None);
        assert!(matches!(
            result,
            Err(TrackPlotError::BedTooFewColumns { line: 2, found: 2 })
        ));
    }

    #[test]
    fn test_invalid_position_and_strand() {
        let file = bedfile("chr1\t-4\t20\n");
        assert!(matches!(
            read_bed_intervals(file.path(), None),
            Err(TrackPlotError::InvalidColumnType { line: 1, .. })
        ));
        let file = bedfile("chr1\t4\t20\tx\t0\t*\n");
        assert!(matches!(
            read_bed_intervals(file.path(), None),
            Err(TrackPlotError::InvalidStrand(_))
        ));
    }

    #[test]
    fn test_chrom_filter() {
        let intervals = vec![
            Interval::new("chr1", 0, 10),
            Interval::new("chr2", 5, 15),
            Interval::new("chr1", 20, 30),
        ];
        let file = bedfile_from(&intervals);
        let chr1 = read_bed_intervals(file.path(), Some("chr1")).unwrap();
        assert_eq!(chr1.len(), 2);
        assert!(chr1.iter().all(|interval| interval.chrom == "chr1"));
    }

    #[test]
    fn test_random_bedfile() {
        let file = random_bedfile(200);
        let intervals = read_bed_intervals(file.path(), None).unwrap();
        assert_eq!(intervals.len(), 200);
        assert!(intervals.iter().all(|interval| interval.start < interval.stop));
    }

    #[test]
    fn test_gzipped_bed() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        let mut file = tempfile::Builder::new().suffix(".bed.gz").tempfile().unwrap();
        {
            let mut encoder = GzEncoder::new(file.as_file_mut(), Compression::default());
            encoder.write_all(b"chr1\t1\t2\nchr1\t3\t4\n").unwrap();
            encoder.finish().unwrap();
        }
        let intervals = read_bed_intervals(file.path(), None).unwrap();
        assert_eq!(intervals, vec![Interval::new("chr1", 1, 2), Interval::new("chr1", 3, 4)]);
    }
}

//! Test cases and test utility functions.
//!

use rand::{thread_rng, Rng};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

use crate::{
    intervals::{Interval, Strand},
    tracks::{Track, TrackConfig},
    Position,
};

// Stochastic test interval defaults
//
// Kept small: the coordinate maps hold one entry per plotted position.
pub const NRANDOM_INTERVALS: usize = 1000;

// interval length
pub const MIN_LEN: Position = 1;
pub const MAX_LEN: Position = 500;

// sequence length
pub const SEQ_LEN: Position = 100_000;

pub const TEST_CHROM: &str = "chr1";

/// Build a random interval start/end on a sequence of `seq_len`.
/// 0-indexed, right exclusive
pub fn random_range(seq_len: Position) -> (Position, Position) {
    let mut rng = thread_rng();
    let len = rng.gen_range(MIN_LEN..MAX_LEN);
    let start = rng.gen_range(0..seq_len - len + 1);
    (start, start + len)
}

/// Build a random named, stranded [`Interval`] on [`TEST_CHROM`].
pub fn random_interval(i: usize) -> Interval {
    let mut rng = thread_rng();
    let (start, stop) = random_range(SEQ_LEN);
    let strand = match rng.gen_range(0..3) {
        0 => Strand::Forward,
        1 => Strand::Reverse,
        _ => Strand::Unknown,
    };
    Interval::new(TEST_CHROM, start, stop)
        .with_name(format!("feature{}", i))
        .with_strand(strand)
}

/// Build a span [`Track`] on [`TEST_CHROM`] from `(start, stop)` pairs.
pub fn track(name: &str, ranges: &[(Position, Position)]) -> Track {
    let intervals = ranges
        .iter()
        .map(|&(start, stop)| Interval::new(TEST_CHROM, start, stop))
        .collect();
    Track::new(name, intervals, TrackConfig::new()).expect("invalid test track")
}

/// Build `n_tracks` random span tracks with `n_intervals` intervals each.
pub fn random_tracks(n_tracks: usize, n_intervals: usize) -> Vec<Track> {
    (0..n_tracks)
        .map(|t| {
            let intervals = (0..n_intervals).map(random_interval).collect();
            Track::new(format!("track{}", t), intervals, TrackConfig::new())
                .expect("invalid random track")
        })
        .collect()
}

/// Create a temporary BED file.
pub fn temp_bedfile() -> NamedTempFile {
    Builder::new()
        .suffix(".bed")
        .tempfile()
        .expect("could not create temporary BED file")
}

/// Write `intervals` as BED6 to a temporary file.
pub fn bedfile_from(intervals: &[Interval]) -> NamedTempFile {
    let mut file = temp_bedfile();
    for interval in intervals {
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t0\t{}",
            interval.chrom,
            interval.start,
            interval.stop,
            interval.feature_name.as_deref().unwrap_or("."),
            interval.strand
        )
        .expect("could not write temporary BED file");
    }
    file.flush().expect("could not flush temporary BED file");
    file
}

/// Write a random BED6 file of `n` intervals, sorted by start.
pub fn random_bedfile(n: usize) -> NamedTempFile {
    let mut intervals: Vec<Interval> = (0..n).map(random_interval).collect();
    intervals.sort_by_key(|interval| interval.start);
    bedfile_from(&intervals)
}

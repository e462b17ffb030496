//! Pockets and coordinate maps.
//!
//! # Design
//!
//! Tracks may hold intervals scattered far apart on a sequence. Rather than
//! drawing the whole sequence, nearby intervals are clustered into
//! [`Pocket`]s: a new pocket is opened whenever an interval starts more than
//! `max_pocket_gap` positions past the furthest stop seen so far. Each pocket
//! is widened by `gap_padding` positions on both sides, and the padded spans
//! are laid end to end to form the *plot-index* space.
//!
//! Three maps tie the coordinate systems together ([`CoordinateMaps`]):
//!
//!  - `x_coords`: plot index → genomic coordinate (dense);
//!  - `g_coords`: genomic coordinate → plot index (the inverse of `x_coords`);
//!  - `f_coords`: plot index → feature-relative coordinate, counted along the
//!    intervals of the coordinate track.
//!
//! Everything here is a pure function of the tracks and the config. A
//! [`Layout`] is rebuilt wholesale whenever the tracks change.
//!
//! Padding never makes two padded spans share a genomic position: padding is
//! clipped at genomic position 0 and at the midpoint between neighbouring
//! pockets. This keeps `g_coords[x_coords[i]] == i` for every plot index.

use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::{
    error::TrackPlotError,
    intervals::Interval,
    plot::PlotConfig,
    reporting::Report,
    tracks::Track,
    traits::GenericRange,
    Position,
};

/// A contiguous genomic region drawn as one unbroken stretch of the plot.
///
/// Pockets are 0-indexed and right-exclusive: `stop` is the largest interval
/// stop inside the pocket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pocket {
    pub start: Position,
    pub stop: Position,
}

impl Pocket {
    pub fn new(start: Position, stop: Position) -> Self {
        Self { start, stop }
    }
}

impl GenericRange for Pocket {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.stop
    }
}

/// The inclusive plot-index range an interval occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlotSpan {
    pub p_start: usize,
    pub p_stop: usize,
}

impl PlotSpan {
    /// Number of plot indices covered; at least one.
    pub fn width(&self) -> usize {
        self.p_stop - self.p_start + 1
    }
}

/// Cluster ranges into pockets. `ranges` must be sorted by start.
///
/// A range starting *strictly* more than `max_pocket_gap` past the highest
/// stop seen so far opens a new pocket; a gap of exactly `max_pocket_gap`
/// stays in the current one. Degenerate ranges count as one position wide.
pub fn find_pockets<R: GenericRange>(ranges: &[R], max_pocket_gap: Position) -> Vec<Pocket> {
    let mut iter = ranges.iter();
    let first = match iter.next() {
        Some(range) => range,
        None => return Vec::new(),
    };

    let mut pockets = Vec::new();
    let mut pocket_start = first.start();
    let mut last_highest_stop = first.occupied_end();
    for range in iter {
        if range.start() > last_highest_stop.saturating_add(max_pocket_gap) {
            pockets.push(Pocket::new(pocket_start, last_highest_stop));
            pocket_start = range.start();
        }
        last_highest_stop = last_highest_stop.max(range.occupied_end());
    }
    pockets.push(Pocket::new(pocket_start, last_highest_stop));
    pockets
}

/// Widen each pocket by `gap_padding` on both sides, clipping at 0 and at the
/// midpoint between neighbouring pockets. Returns half-open genomic spans.
pub fn padded_spans(
    pockets: &[Pocket],
    gap_padding: Position,
    report: &mut Report,
) -> Vec<(Position, Position)> {
    let mut clipped = 0;
    let spans = pockets
        .iter()
        .enumerate()
        .map(|(i, pocket)| {
            let mut left = pocket.start.saturating_sub(gap_padding);
            let mut right = pocket.stop.saturating_add(gap_padding);
            if i > 0 {
                let previous = pockets[i - 1];
                let midpoint = previous.stop + (pocket.start - previous.stop) / 2;
                if left < midpoint {
                    left = midpoint;
                    clipped += 1;
                }
            }
            if let Some(next) = pockets.get(i + 1) {
                let midpoint = pocket.stop + (next.start - pocket.stop) / 2;
                right = right.min(midpoint);
            }
            (left, right)
        })
        .collect();

    if clipped > 0 {
        warn!(
            "gap padding of {} clipped between {} pair(s) of close pockets",
            gap_padding, clipped
        );
        report.add_issue(format!(
            "gap padding of {} positions was clipped between {} pair(s) of pockets closer than twice the padding",
            gap_padding, clipped
        ));
    }
    spans
}

/// The bidirectional maps between genomic, plot-index and feature-relative
/// coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoordinateMaps {
    x_coords: Vec<Position>,
    g_coords: IndexMap<Position, usize>,
    f_coords: BTreeMap<usize, Position>,
}

impl CoordinateMaps {
    /// Build `x_coords` and `g_coords` from padded genomic spans laid end to end.
    pub fn from_spans(spans: &[(Position, Position)]) -> Self {
        let x_coords: Vec<Position> = spans.iter().flat_map(|&(start, stop)| start..stop).collect();
        let g_coords = x_coords
            .iter()
            .enumerate()
            .map(|(index, &genomic)| (genomic, index))
            .collect();
        Self {
            x_coords,
            g_coords,
            f_coords: BTreeMap::new(),
        }
    }

    /// Assign feature-relative coordinates along `intervals`, in order.
    ///
    /// When intervals overlap, a plot index keeps the first feature-relative
    /// coordinate it was given, though the count still advances.
    pub fn assign_feature_coords(&mut self, intervals: &[Interval]) {
        self.f_coords.clear();
        let mut counter: Position = 0;
        for interval in intervals {
            for genomic in interval.start..interval.stop {
                if let Some(&index) = self.g_coords.get(&genomic) {
                    self.f_coords.entry(index).or_insert(counter);
                    counter += 1;
                }
            }
        }
    }

    /// Length of the plot-index space.
    pub fn len(&self) -> usize {
        self.x_coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_coords.is_empty()
    }

    /// Genomic coordinate at a plot index.
    pub fn genomic(&self, plot_index: usize) -> Option<Position> {
        self.x_coords.get(plot_index).copied()
    }

    /// Plot index of a genomic coordinate, if it is on the plot.
    pub fn plot_index(&self, genomic: Position) -> Option<usize> {
        self.g_coords.get(&genomic).copied()
    }

    /// Feature-relative coordinate at a plot index, if the coordinate track
    /// covers it.
    pub fn feature(&self, plot_index: usize) -> Option<Position> {
        self.f_coords.get(&plot_index).copied()
    }

    pub fn x_coords(&self) -> &[Position] {
        &self.x_coords
    }

    pub fn g_coords(&self) -> &IndexMap<Position, usize> {
        &self.g_coords
    }

    pub fn f_coords(&self) -> &BTreeMap<usize, Position> {
        &self.f_coords
    }
}

/// Everything derived from the tracks: pockets, coordinate maps and the plot
/// span of every interval of every track.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub seqname: String,
    pub pockets: Vec<Pocket>,
    /// Half-open genomic spans of the pockets after padding.
    pub padded: Vec<(Position, Position)>,
    pub maps: CoordinateMaps,
    /// Name of the track feature-relative coordinates are counted along.
    pub coordinate_track: String,
    /// Plot spans per track name, parallel to each track's intervals.
    pub spans: IndexMap<String, Vec<PlotSpan>>,
    pub report: Report,
}

impl Layout {
    /// Length of the plot-index space.
    pub fn plot_length(&self) -> usize {
        self.maps.len()
    }

    /// Exclusive plot index where each pocket's padded span ends. These are
    /// the visual breaks between pockets; the last equals the plot length.
    pub fn pocket_ends(&self) -> Vec<usize> {
        self.padded
            .iter()
            .scan(0, |offset, &(start, stop)| {
                *offset += (stop - start) as usize;
                Some(*offset)
            })
            .collect()
    }

    pub fn track_spans(&self, track: &str) -> Option<&[PlotSpan]> {
        self.spans.get(track).map(|spans| spans.as_slice())
    }
}

/// Rebuild pockets, coordinate maps and interval plot spans from `tracks`.
///
/// # Errors
///
/// [`TrackPlotError::EmptyInput`] if the tracks hold no intervals at all, and
/// [`TrackPlotError::MultipleSequences`] if intervals lie on more than one
/// sequence.
pub fn recalculate_pockets(tracks: &[Track], config: &PlotConfig) -> Result<Layout, TrackPlotError> {
    let mut all_intervals: Vec<&Interval> = tracks.iter().flat_map(|track| track.intervals.iter()).collect();
    let seqname = match all_intervals.first() {
        Some(interval) => interval.chrom.clone(),
        None => return Err(TrackPlotError::EmptyInput),
    };
    if let Some(other) = all_intervals.iter().find(|interval| interval.chrom != seqname) {
        return Err(TrackPlotError::MultipleSequences(seqname, other.chrom.clone()));
    }
    all_intervals.sort_by_key(|interval| interval.start);

    let mut report = Report::new();
    let pockets = find_pockets(&all_intervals, config.max_pocket_gap);
    let padded = padded_spans(&pockets, config.gap_padding, &mut report);
    let mut maps = CoordinateMaps::from_spans(&padded);

    // all_intervals is non-empty, so there is at least one track
    let mut reference = config.coordinate_track;
    if reference >= tracks.len() {
        reference = tracks.len() - 1;
        warn!(
            "coordinate track {} out of range, using track {}",
            config.coordinate_track, reference
        );
        report.add_issue(format!(
            "coordinate track index {} is out of range; track '{}' used instead",
            config.coordinate_track, tracks[reference].name
        ));
    }
    maps.assign_feature_coords(&tracks[reference].intervals);

    let degenerate = all_intervals.iter().filter(|interval| interval.is_degenerate()).count();
    if degenerate > 0 {
        debug!("{} zero-width intervals laid out one position wide", degenerate);
        report.add_issue(format!(
            "{} zero-width interval(s) drawn one position wide",
            degenerate
        ));
    }

    // every interval lies inside a pocket, so its positions are all in g_coords
    let spans = tracks
        .iter()
        .map(|track| {
            let spans = track
                .intervals
                .iter()
                .map(|interval| {
                    let p_start = maps.g_coords[&interval.start];
                    let p_stop = if interval.is_degenerate() {
                        p_start
                    } else {
                        maps.g_coords[&(interval.stop - 1)]
                    };
                    PlotSpan { p_start, p_stop }
                })
                .collect();
            (track.name.clone(), spans)
        })
        .collect();

    debug!(
        "{} pockets over {} intervals, plot length {}",
        pockets.len(),
        all_intervals.len(),
        maps.len()
    );

    Ok(Layout {
        seqname,
        pockets,
        padded,
        maps,
        coordinate_track: tracks[reference].name.clone(),
        spans,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{random_tracks, track};
    use crate::tracks::{PointStyle, TrackConfig, TrackKind};

    fn config(max_pocket_gap: Position, gap_padding: Position) -> PlotConfig {
        PlotConfig {
            max_pocket_gap,
            gap_padding,
            ..PlotConfig::default()
        }
    }

    #[test]
    fn test_one_pocket_within_gap() {
        let tracks = vec![track("a", &[(0, 10), (15, 20)])];
        let layout = recalculate_pockets(&tracks, &config(20, 0)).unwrap();
        assert_eq!(layout.pockets, vec![Pocket::new(0, 20)]);
    }

    #[test]
    fn test_two_pockets_beyond_gap() {
        let tracks = vec![track("a", &[(0, 10), (15, 20)])];
        let layout = recalculate_pockets(&tracks, &config(2, 0)).unwrap();
        assert_eq!(layout.pockets, vec![Pocket::new(0, 10), Pocket::new(15, 20)]);
    }

    #[test]
    fn test_gap_threshold_is_strict() {
        let gap = 7;
        let same = vec![track("a", &[(0, 10), (10 + gap, 30)])];
        let layout = recalculate_pockets(&same, &config(gap, 0)).unwrap();
        assert_eq!(layout.pockets.len(), 1);

        let split = vec![track("a", &[(0, 10), (10 + gap + 1, 30)])];
        let layout = recalculate_pockets(&split, &config(gap, 0)).unwrap();
        assert_eq!(layout.pockets.len(), 2);
    }

    #[test]
    fn test_running_max_stop() {
        // the long first interval swallows the second and keeps the third close
        let tracks = vec![track("a", &[(0, 100), (10, 20), (105, 110)])];
        let layout = recalculate_pockets(&tracks, &config(10, 0)).unwrap();
        assert_eq!(layout.pockets, vec![Pocket::new(0, 110)]);
    }

    #[test]
    fn test_no_spurious_pocket_at_zero() {
        let tracks = vec![track("a", &[(1000, 1010)])];
        let layout = recalculate_pockets(&tracks, &config(20, 5)).unwrap();
        assert_eq!(layout.pockets, vec![Pocket::new(1000, 1010)]);
        assert_eq!(layout.maps.x_coords().first(), Some(&995));
        assert_eq!(layout.maps.x_coords().last(), Some(&1014));
        assert_eq!(layout.plot_length(), 20);
    }

    #[test]
    fn test_empty_input() {
        let tracks = vec![track("a", &[])];
        assert!(matches!(
            recalculate_pockets(&tracks, &PlotConfig::default()),
            Err(TrackPlotError::EmptyInput)
        ));
        assert!(matches!(
            recalculate_pockets(&[], &PlotConfig::default()),
            Err(TrackPlotError::EmptyInput)
        ));
    }

    #[test]
    fn test_multiple_sequences_rejected() {
        let a = Track::new("a", vec![Interval::new("chr1", 0, 10)], TrackConfig::new()).unwrap();
        let b = Track::new("b", vec![Interval::new("chr2", 0, 10)], TrackConfig::new()).unwrap();
        assert!(matches!(
            recalculate_pockets(&[a, b], &PlotConfig::default()),
            Err(TrackPlotError::MultipleSequences(_, _))
        ));
    }

    #[test]
    fn test_padding_clipped_at_zero() {
        let tracks = vec![track("a", &[(3, 10)])];
        let layout = recalculate_pockets(&tracks, &config(20, 80)).unwrap();
        assert_eq!(layout.padded, vec![(0, 90)]);
        assert_eq!(layout.maps.plot_index(0), Some(0));
    }

    #[test]
    fn test_padding_clipped_between_pockets() {
        let tracks = vec![track("a", &[(100, 110), (140, 150)])];
        let layout = recalculate_pockets(&tracks, &config(20, 80)).unwrap();
        assert_eq!(layout.padded, vec![(20, 125), (125, 230)]);
        assert!(!layout.report.is_empty());
        for (i, genomic) in layout.maps.x_coords().iter().enumerate() {
            assert_eq!(layout.maps.plot_index(*genomic), Some(i));
        }
    }

    #[test]
    fn test_inverse_law_random() {
        for _ in 0..20 {
            let tracks = random_tracks(3, 50);
            let layout = recalculate_pockets(&tracks, &PlotConfig::default()).unwrap();
            for (i, genomic) in layout.maps.x_coords().iter().enumerate() {
                assert_eq!(layout.maps.plot_index(*genomic), Some(i));
            }
            assert_eq!(layout.maps.g_coords().len(), layout.plot_length());
        }
    }

    #[test]
    fn test_pockets_sorted_and_separated_random() {
        let config = PlotConfig::default();
        for _ in 0..20 {
            let tracks = random_tracks(2, 40);
            let layout = recalculate_pockets(&tracks, &config).unwrap();
            for pair in layout.pockets.windows(2) {
                assert!(pair[0].start < pair[0].stop);
                assert!(pair[1].start > pair[0].stop + config.max_pocket_gap);
            }
        }
    }

    #[test]
    fn test_spans_never_inverted_random() {
        for _ in 0..20 {
            let tracks = random_tracks(3, 50);
            let layout = recalculate_pockets(&tracks, &PlotConfig::default()).unwrap();
            for track in &tracks {
                let spans = layout.track_spans(&track.name).unwrap();
                assert_eq!(spans.len(), track.intervals.len());
                for (span, interval) in spans.iter().zip(&track.intervals) {
                    assert!(span.p_start <= span.p_stop);
                    assert_eq!(span.width(), interval.width() as usize);
                }
            }
        }
    }

    #[test]
    fn test_plot_span_half_open_translation() {
        let tracks = vec![track("a", &[(10, 20)])];
        let layout = recalculate_pockets(&tracks, &config(20, 2)).unwrap();
        let span = layout.track_spans("a").unwrap()[0];
        assert_eq!(span, PlotSpan { p_start: 2, p_stop: 11 });
        assert_eq!(layout.maps.genomic(span.p_start), Some(10));
        assert_eq!(layout.maps.genomic(span.p_stop), Some(19));
    }

    #[test]
    fn test_degenerate_interval_span() {
        let sites = Track::new(
            "sites",
            vec![Interval::new("chr1", 50, 50)],
            TrackConfig::new().kind(TrackKind::Point(PointStyle::default())),
        )
        .unwrap();
        let layout = recalculate_pockets(&[sites], &config(20, 0)).unwrap();
        assert_eq!(layout.pockets, vec![Pocket::new(50, 51)]);
        let span = layout.track_spans("sites").unwrap()[0];
        assert_eq!(span.p_start, span.p_stop);
        assert_eq!(layout.report.issues().len(), 1);
    }

    #[test]
    fn test_feature_coords() {
        let reference = track("ref", &[(0, 3), (10, 12)]);
        let other = track("other", &[(5, 8)]);
        let layout = recalculate_pockets(&[reference, other], &config(20, 0)).unwrap();
        let maps = &layout.maps;
        let features: Vec<(usize, Position)> = maps.f_coords().iter().map(|(&i, &f)| (i, f)).collect();
        assert_eq!(features, vec![(0, 0), (1, 1), (2, 2), (10, 3), (11, 4)]);
        // positions covered only by the other track have no feature coordinate
        assert_eq!(maps.feature(maps.plot_index(6).unwrap()), None);
        assert_eq!(layout.coordinate_track, "ref");
    }

    #[test]
    fn test_feature_coords_overlap_keeps_first() {
        let reference = track("ref", &[(0, 4), (2, 6)]);
        let layout = recalculate_pockets(&[reference], &config(20, 0)).unwrap();
        let maps = &layout.maps;
        assert_eq!(maps.feature(2), Some(2));
        assert_eq!(maps.feature(4), Some(6));
        assert_eq!(maps.f_coords().len(), 6);
    }

    #[test]
    fn test_coordinate_track_clamped() {
        let tracks = vec![track("a", &[(0, 5)]), track("b", &[(10, 12)])];
        let config = PlotConfig {
            coordinate_track: 9,
            gap_padding: 0,
            ..PlotConfig::default()
        };
        let layout = recalculate_pockets(&tracks, &config).unwrap();
        assert_eq!(layout.coordinate_track, "b");
        assert_eq!(layout.maps.f_coords().len(), 2);
        assert_eq!(layout.report.issues().len(), 1);
    }

    #[test]
    fn test_pocket_ends() {
        let tracks = vec![track("a", &[(0, 10), (100, 105)])];
        let layout = recalculate_pockets(&tracks, &config(20, 2)).unwrap();
        // (0, 12) and (98, 107)
        assert_eq!(layout.pocket_ends(), vec![12, 21]);
        assert_eq!(*layout.pocket_ends().last().unwrap(), layout.plot_length());
    }
}

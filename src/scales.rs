//! Linear scales from plot space to pixels.
//!
//! The x scale maps the whole plot-index domain `[0, plot_length]` onto the
//! horizontal pixel range between the left and right margins. Each track gets
//! its own y scale mapping its normalized height `[-1, 1]` onto a vertical band
//! whose size is the track's share of the total `y_fraction`. Bands are stacked
//! top to bottom in track order.
//!
//! Scales are plain values rebuilt from scratch whenever the layout, the track
//! set or the viewport size changes.

use log::debug;

use crate::{
    error::TrackPlotError,
    plot::{PlotConfig, Viewport},
    pockets::Layout,
    tracks::Track,
};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// A continuous linear map from a domain interval to a range interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value to the range. A collapsed domain maps everything to
    /// the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    /// Map a range value back to the domain.
    pub fn invert(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if r1 == r0 { 0.5 } else { (value - r0) / (r1 - r0) };
        d0 + t * (d1 - d0)
    }

    /// Same range, new domain.
    pub fn with_domain(&self, domain: (f64, f64)) -> Self {
        Self::new(domain, self.range)
    }

    /// Roughly `count` evenly spaced, round-valued ticks inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count as f64)
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let increment = 10f64.powf(-power) / factor;
        i1 = (start * increment).round();
        i2 = (stop * increment).round();
        if i1 / increment < start {
            i1 += 1.0;
        }
        if i2 / increment > stop {
            i2 -= 1.0;
        }
        inc = -increment;
    } else {
        let increment = 10f64.powf(power) * factor;
        i1 = (start / increment).round();
        i2 = (stop / increment).round();
        if i1 * increment < start {
            i1 += 1.0;
        }
        if i2 * increment > stop {
            i2 -= 1.0;
        }
        inc = increment;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// "Nice" ticks between `start` and `stop`, as d3-array's `ticks`.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count);
    if !(i2 >= i1) {
        return Vec::new();
    }
    let n = (i2 - i1 + 1.0) as usize;
    let mut ticks: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect();
    if reverse {
        ticks.reverse();
    }
    ticks
}

/// Base scales for one viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct Scales {
    pub x: LinearScale,
    /// One y scale per track, in track order.
    pub ys: Vec<LinearScale>,
}

impl Scales {
    pub fn compute(
        tracks: &[Track],
        layout: &Layout,
        viewport: &Viewport,
        config: &PlotConfig,
    ) -> Result<Self, TrackPlotError> {
        let ys = update_ys(tracks, viewport, config)?;
        let x = update_x(layout, viewport, config);
        Ok(Self { x, ys })
    }
}

/// The x scale: plot index `[0, plot_length]` to `[margin_left, width - margin_right]`.
pub fn update_x(layout: &Layout, viewport: &Viewport, config: &PlotConfig) -> LinearScale {
    let scale = LinearScale::new(
        (0.0, layout.plot_length() as f64),
        (config.margin_left, viewport.width - config.margin_right),
    );
    debug!("x scale {:?} -> {:?}", scale.domain, scale.range);
    scale
}

/// Per-track y scales: domain `[-1, 1]` onto stacked vertical bands sized by
/// each track's share of the total `y_fraction`.
///
/// # Errors
///
/// [`TrackPlotError::NoTracks`] if there are no tracks (or their fractions
/// sum to zero).
pub fn update_ys(
    tracks: &[Track],
    viewport: &Viewport,
    config: &PlotConfig,
) -> Result<Vec<LinearScale>, TrackPlotError> {
    let fraction_total: f64 = tracks.iter().map(|track| track.y_fraction).sum();
    if tracks.is_empty() || !(fraction_total > 0.0) {
        return Err(TrackPlotError::NoTracks);
    }
    let available = viewport.height - config.margin_top - config.margin_bottom;

    let mut top = config.margin_top;
    let scales = tracks
        .iter()
        .map(|track| {
            let bottom = top + track.y_fraction / fraction_total * available;
            // +1 is up: the top of the band
            let scale = LinearScale::new((-1.0, 1.0), (bottom, top));
            top = bottom;
            scale
        })
        .collect::<Vec<_>>();
    debug!("{} y scales over {} px", scales.len(), available);
    Ok(scales)
}

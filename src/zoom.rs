//! Interactive zoom and pan.
//!
//! A [`ZoomTransform`] is an affine map `px ↦ px * k + x` applied on top of
//! the base x scale. It never touches pockets or coordinate maps: zooming only
//! changes which part of the plot-index domain is visible. The
//! [`ZoomController`] turns gestures into transforms and keeps them within
//! the configured scale extent and the horizontal plot area; out of range
//! requests are clamped, never rejected.

use log::trace;

use crate::{
    plot::{PlotConfig, Viewport},
    scales::LinearScale,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.k + self.x
    }

    pub fn apply_y(&self, y: f64) -> f64 {
        y * self.k + self.y
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.y) / self.k
    }

    /// Translate by `(tx, ty)` in untransformed units.
    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        Self::new(self.k, self.x + self.k * tx, self.y + self.k * ty)
    }

    /// The x scale as seen through this transform: same range, with the domain
    /// narrowed to what is visible.
    pub fn rescale_x(&self, scale: &LinearScale) -> LinearScale {
        let (r0, r1) = scale.range;
        scale.with_domain((
            scale.invert(self.invert_x(r0)),
            scale.invert(self.invert_x(r1)),
        ))
    }
}

/// How a wheel event's delta is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// User input the viewport reacts to. Points are in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomGesture {
    Wheel {
        delta_y: f64,
        mode: DeltaMode,
        ctrl: bool,
        pointer: (f64, f64),
    },
    /// Pointer moved by `(dx, dy)` while held down.
    Drag { dx: f64, dy: f64 },
    /// Doubles the scale at the pointer, or halves it with shift.
    DoubleClick { pointer: (f64, f64), shift: bool },
    /// Zoom to an absolute scale keeping `anchor` (default: extent centre) fixed.
    ScaleTo { k: f64, anchor: Option<(f64, f64)> },
    Reset,
}

/// Scale factor exponent for a wheel event, as d3-zoom's default.
pub fn wheel_delta(delta_y: f64, mode: DeltaMode, ctrl: bool) -> f64 {
    let unit = match mode {
        DeltaMode::Pixel => 0.002,
        DeltaMode::Line => 0.05,
        DeltaMode::Page => 1.0,
    };
    -delta_y * unit * if ctrl { 10.0 } else { 1.0 }
}

/// Holds the current transform and the bounds it must respect.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomController {
    transform: ZoomTransform,
    scale_extent: (f64, f64),
    /// Viewport extent `[[x0, y0], [x1, y1]]`.
    extent: [(f64, f64); 2],
    translate_extent: [(f64, f64); 2],
}

impl ZoomController {
    pub fn new(config: &PlotConfig, viewport: &Viewport) -> Self {
        let left = config.margin_left;
        let right = viewport.width - config.margin_right;
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent: (config.min_scale, config.max_scale),
            extent: [(left, 0.0), (right, viewport.height)],
            translate_extent: [(left, f64::NEG_INFINITY), (right, f64::INFINITY)],
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }

    /// The base x scale as currently zoomed.
    pub fn rescale_x(&self, scale: &LinearScale) -> LinearScale {
        self.transform.rescale_x(scale)
    }

    /// Apply a gesture and return the new transform.
    pub fn apply(&mut self, gesture: ZoomGesture) -> ZoomTransform {
        let t0 = self.transform;
        let next = match gesture {
            ZoomGesture::Wheel {
                delta_y,
                mode,
                ctrl,
                pointer,
            } => {
                let k = t0.k * 2f64.powf(wheel_delta(delta_y, mode, ctrl));
                self.zoom_about(k, pointer)
            }
            ZoomGesture::Drag { dx, dy } => {
                self.constrain(ZoomTransform::new(t0.k, t0.x + dx, t0.y + dy))
            }
            ZoomGesture::DoubleClick { pointer, shift } => {
                let factor = if shift { 0.5 } else { 2.0 };
                self.zoom_about(t0.k * factor, pointer)
            }
            ZoomGesture::ScaleTo { k, anchor } => {
                let anchor = anchor.unwrap_or_else(|| self.centroid());
                self.zoom_about(k, anchor)
            }
            ZoomGesture::Reset => ZoomTransform::IDENTITY,
        };
        trace!("zoom {:?} -> {:?}", gesture, next);
        self.transform = next;
        next
    }

    fn centroid(&self) -> (f64, f64) {
        let [(x0, y0), (x1, y1)] = self.extent;
        ((x0 + x1) / 2.0, (y0 + y1) / 2.0)
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        let (min, max) = self.scale_extent;
        if k.is_nan() {
            return self.transform.k;
        }
        k.min(max).max(min)
    }

    /// Rescale to `k` keeping the content under `anchor` in place.
    fn zoom_about(&self, k: f64, anchor: (f64, f64)) -> ZoomTransform {
        let t0 = self.transform;
        let k = self.clamp_scale(k);
        let (px, py) = anchor;
        let world = (t0.invert_x(px), t0.invert_y(py));
        let scaled = ZoomTransform::new(k, px - world.0 * k, py - world.1 * k);
        self.constrain(scaled)
    }

    /// Shift the transform so the viewport stays inside the translate extent.
    /// Where the extent is smaller than the viewport, it is centred.
    fn constrain(&self, transform: ZoomTransform) -> ZoomTransform {
        let [(ex0, ey0), (ex1, ey1)] = self.extent;
        let [(tx0, ty0), (tx1, ty1)] = self.translate_extent;
        let dx0 = transform.invert_x(ex0) - tx0;
        let dx1 = transform.invert_x(ex1) - tx1;
        let dy0 = transform.invert_y(ey0) - ty0;
        let dy1 = transform.invert_y(ey1) - ty1;
        transform.translate(shift(dx0, dx1), shift(dy0, dy1))
    }
}

fn shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else {
        let low = d0.min(0.0);
        if low != 0.0 {
            low
        } else {
            d1.max(0.0)
        }
    }
}

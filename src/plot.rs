//! The [`TrackPlot`] and its [`PlotState`].
//!
//! # Design
//!
//! All derived plot data (the layout of pockets and coordinate maps, and the
//! scales) lives in one [`PlotState`] value. Every mutation builds a complete
//! new state from the old one with pure functions and only then swaps it in,
//! so a failed mutation leaves the previous state untouched and a reader
//! holding a [`snapshot`](TrackPlot::snapshot) never sees a half-built map.
//!
//! The zoom transform sits outside the state: zooming re-renders with a
//! rescaled x scale but never rebuilds the layout. Structural changes (adding
//! or removing a track, resizing) reset the zoom to the identity.

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    error::TrackPlotError,
    intervals::Interval,
    io::InputFile,
    pockets::{recalculate_pockets, Layout},
    render::{Frame, FrameKind, Renderer},
    scales::Scales,
    tracks::{TrackConfig, TrackRegistry},
    zoom::{ZoomController, ZoomGesture, ZoomTransform},
    Position,
};

/// Plot-wide settings. Missing fields in a config file take the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    /// Largest genomic distance between intervals that still share a pocket.
    pub max_pocket_gap: Position,
    /// Genomic positions of padding drawn on each side of a pocket.
    pub gap_padding: Position,
    /// Index (in stacking order) of the track feature coordinates follow.
    pub coordinate_track: usize,
    pub add_track_labels: bool,
    pub add_interval_labels: bool,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Settings for tracks loaded by name, e.g. from the command line.
    pub tracks: IndexMap<String, TrackConfig>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            margin_left: 40.0,
            margin_right: 40.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
            max_pocket_gap: 20,
            gap_padding: 80,
            coordinate_track: 0,
            add_track_labels: false,
            add_interval_labels: false,
            min_scale: 1.0,
            max_scale: 800.0,
            tracks: IndexMap::new(),
        }
    }
}

impl PlotConfig {
    /// Read a JSON config file (plain or gzip-compressed).
    pub fn from_json_file(filepath: impl Into<PathBuf>) -> Result<Self, TrackPlotError> {
        let contents = InputFile::new(filepath).read_to_string()?;
        let config: PlotConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackPlotError> {
        let margins = [
            self.margin_left,
            self.margin_right,
            self.margin_top,
            self.margin_bottom,
        ];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(TrackPlotError::InvalidConfig(
                "margins must be finite and non-negative".to_string(),
            ));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale.is_finite()) {
            return Err(TrackPlotError::InvalidConfig(format!(
                "zoom scale extent [{}, {}] is invalid",
                self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }
}

/// Pixel size of the drawing area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 500.0)
    }
}

/// An immutable snapshot of everything the renderers read.
///
/// `layout` and `scales` are `None` exactly when no track holds an interval.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotState {
    pub config: PlotConfig,
    pub viewport: Viewport,
    pub registry: TrackRegistry,
    pub layout: Option<Layout>,
    pub scales: Option<Scales>,
}

impl PlotState {
    pub fn empty(config: PlotConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport,
            registry: TrackRegistry::new(),
            layout: None,
            scales: None,
        }
    }

    /// Build a state from scratch: recalculate pockets, then the scales.
    pub fn build(
        config: PlotConfig,
        viewport: Viewport,
        registry: TrackRegistry,
    ) -> Result<Self, TrackPlotError> {
        if registry.tracks().iter().all(|track| track.is_empty()) {
            return Ok(Self {
                registry,
                ..Self::empty(config, viewport)
            });
        }
        let layout = recalculate_pockets(registry.tracks(), &config)?;
        let scales = Scales::compute(registry.tracks(), &layout, &viewport, &config)?;
        Ok(Self {
            config,
            viewport,
            registry,
            layout: Some(layout),
            scales: Some(scales),
        })
    }

    /// The same tracks and layout on a different viewport; only scales change.
    pub fn with_viewport(&self, viewport: Viewport) -> Result<Self, TrackPlotError> {
        let scales = match &self.layout {
            Some(layout) => Some(Scales::compute(
                self.registry.tracks(),
                layout,
                &viewport,
                &self.config,
            )?),
            None => None,
        };
        Ok(Self {
            viewport,
            scales,
            ..self.clone()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Whether there is a layout to draw.
    pub fn has_layout(&self) -> bool {
        self.layout.is_some()
    }
}

/// A multi-track plot: the track registry, its derived state, the zoom
/// controller and a [`Renderer`] that draws it.
pub struct TrackPlot<R: Renderer> {
    state: Arc<PlotState>,
    zoom: Option<ZoomController>,
    renderer: R,
}

impl<R: Renderer> TrackPlot<R> {
    pub fn new(config: PlotConfig, viewport: Viewport, renderer: R) -> Result<Self, TrackPlotError> {
        config.validate()?;
        Ok(Self {
            state: Arc::new(PlotState::empty(config, viewport)),
            zoom: None,
            renderer,
        })
    }

    pub fn state(&self) -> &PlotState {
        &self.state
    }

    /// A shared read-only handle on the current state.
    pub fn snapshot(&self) -> Arc<PlotState> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &PlotConfig {
        &self.state.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// The current zoom transform (identity if zoom is not initialized).
    pub fn transform(&self) -> ZoomTransform {
        self.zoom
            .as_ref()
            .map_or(ZoomTransform::IDENTITY, |zoom| zoom.transform())
    }

    /// Register a track, rebuild the layout and scales, and redraw.
    ///
    /// On error the plot is left exactly as it was.
    pub fn add_track(
        &mut self,
        name: &str,
        intervals: Vec<Interval>,
        config: TrackConfig,
    ) -> Result<(), TrackPlotError> {
        self.add_tracks([(name.to_string(), intervals, config)])
    }

    /// Register several tracks at once and lay them out together. The
    /// result does not depend on the order of `tracks` beyond ties in
    /// `y_order`.
    ///
    /// Fails with [`TrackPlotError::EmptyInput`] if no track in the plot
    /// would hold an interval. On error the plot is left exactly as it was.
    pub fn add_tracks<I>(&mut self, tracks: I) -> Result<(), TrackPlotError>
    where
        I: IntoIterator<Item = (String, Vec<Interval>, TrackConfig)>,
    {
        let mut registry = self.state.registry.clone();
        for (name, intervals, config) in tracks {
            registry.add_track(&name, intervals, config)?;
        }
        let next = PlotState::build(self.state.config.clone(), self.state.viewport, registry)?;
        if !next.has_layout() {
            return Err(TrackPlotError::EmptyInput);
        }
        self.swap(next);
        self.draw()
    }

    /// Remove a track, release its rendering resources, rebuild and redraw.
    pub fn remove_track(&mut self, name: &str) -> Result<(), TrackPlotError> {
        let mut registry = self.state.registry.clone();
        registry.remove_track(name)?;
        let next = PlotState::build(self.state.config.clone(), self.state.viewport, registry)?;
        self.swap(next);
        self.renderer.release_track(name);
        if !self.state.has_layout() {
            self.renderer.clear();
            return Ok(());
        }
        self.draw()
    }

    /// Change the viewport size, rebuild the scales and redraw.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), TrackPlotError> {
        let next = self.state.with_viewport(Viewport::new(width, height))?;
        self.swap(next);
        if !self.state.has_layout() {
            return Ok(());
        }
        self.draw()
    }

    /// Re-render everything from the current state. Calling it repeatedly
    /// without changes renders identical frames.
    pub fn draw(&mut self) -> Result<(), TrackPlotError> {
        let state = self.snapshot();
        let frame = Self::frame(&state, self.transform(), FrameKind::Full)
            .ok_or(TrackPlotError::NoTracks)?;
        self.renderer.render(&frame);
        Ok(())
    }

    /// Start reacting to zoom gestures. Calling it again resets the zoom.
    pub fn initialize_zoom(&mut self) {
        self.zoom = Some(ZoomController::new(&self.state.config, &self.state.viewport));
    }

    /// Handle a zoom or pan gesture: update the transform and re-render with
    /// the rescaled x scale. Returns `None` (and does nothing) before
    /// [`initialize_zoom()`](Self::initialize_zoom) or while the plot is empty.
    pub fn zoomed(&mut self, gesture: ZoomGesture) -> Option<ZoomTransform> {
        if !self.state.has_layout() {
            return None;
        }
        let transform = self.zoom.as_mut()?.apply(gesture);
        let state = self.snapshot();
        if let Some(frame) = Self::frame(&state, transform, FrameKind::Zoom) {
            self.renderer.render(&frame);
        }
        Some(transform)
    }

    fn frame(state: &PlotState, transform: ZoomTransform, kind: FrameKind) -> Option<Frame<'_>> {
        let scales = state.scales.as_ref()?;
        let x = transform.rescale_x(&scales.x);
        Frame::new(state, x, transform, kind)
    }

    fn swap(&mut self, next: PlotState) {
        if let Some(layout) = &next.layout {
            debug!(
                "new plot state: {} tracks, {} pockets, plot length {}",
                next.registry.len(),
                layout.pockets.len(),
                layout.plot_length()
            );
        }
        self.state = Arc::new(next);
        if let Some(zoom) = self.zoom.as_mut() {
            info!("plot structure changed, zoom reset");
            *zoom = ZoomController::new(&self.state.config, &self.state.viewport);
        }
    }
}

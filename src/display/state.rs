//! Display state and the scoped guard that preserves it
//!
//! `DisplayState` is the configuration a renderer reads and writes while it
//! draws: margins, background colour, title, the user coordinate
//! extent of the last plot. It is passed around explicitly; there is no
//! process-wide copy.

use crate::raster::Extent;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

use super::DisplayOptions;

/// Plot margins in lines of text, clockwise from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub bottom: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
}

impl Margins {
    pub fn zero() -> Self {
        Self {
            bottom: 0.0,
            left: 0.0,
            top: 0.0,
            right: 0.0,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            bottom: 5.1,
            left: 4.1,
            top: 4.1,
            right: 2.1,
        }
    }
}

/// Mutable configuration of a display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayState {
    pub margins: Margins,
    pub background: [u8; 3],
    pub title: Option<String>,
    /// Coordinate extent of the most recent plot
    pub user_extent: Option<Extent>,
    /// Backend-specific settings
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            background: [255, 255, 255],
            title: None,
            user_extent: None,
            extra: Map::new(),
        }
    }
}

impl DisplayState {
    /// Set up the surface for a full-bleed raster plot covering `extent`.
    ///
    /// Drops the margins, records the extent as the user coordinate system,
    /// and takes over background and title when the options carry them.
    pub fn begin_raster_plot(&mut self, extent: Extent, options: &DisplayOptions) {
        self.margins = Margins::zero();
        self.user_extent = Some(extent);
        if let Some(background) = options.background {
            self.background = background;
        }
        if let Some(title) = &options.title {
            self.title = Some(title.clone());
        }
    }
}

// ============================================================================
// StateGuard
// ============================================================================

/// Scoped access to a `DisplayState`.
///
/// When created with `capture`, a snapshot is taken immediately and written
/// back when the guard drops: on normal return, on `?` early return, and
/// while unwinding from a panic. A `passthrough` guard leaves any changes in
/// place.
pub struct StateGuard<'a> {
    state: &'a mut DisplayState,
    saved: Option<DisplayState>,
}

impl<'a> StateGuard<'a> {
    pub fn new(state: &'a mut DisplayState, preserve: bool) -> Self {
        if preserve {
            Self::capture(state)
        } else {
            Self::passthrough(state)
        }
    }

    pub fn capture(state: &'a mut DisplayState) -> Self {
        debug!("capturing display state");
        let saved = Some(state.clone());
        Self { state, saved }
    }

    pub fn passthrough(state: &'a mut DisplayState) -> Self {
        Self { state, saved: None }
    }

    pub fn is_preserving(&self) -> bool {
        self.saved.is_some()
    }
}

impl Deref for StateGuard<'_> {
    type Target = DisplayState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for StateGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            debug!("restoring display state");
            *self.state = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    fn plotted(state: &mut DisplayState) {
        state.begin_raster_plot(
            Extent::pixel_centered(4, 3),
            &DisplayOptions {
                title: Some("relief".to_string()),
                ..DisplayOptions::default()
            },
        );
    }

    #[test]
    fn test_begin_raster_plot() {
        let mut state = DisplayState::default();
        plotted(&mut state);
        assert_eq!(state.margins, Margins::zero());
        assert_eq!(state.user_extent, Some(Extent::pixel_centered(4, 3)));
        assert_eq!(state.title.as_deref(), Some("relief"));
        assert_eq!(state.background, [255, 255, 255]);
    }

    #[test]
    fn test_capture_restores_on_drop() {
        let mut state = DisplayState::default();
        let before = state.clone();
        {
            let mut guard = StateGuard::capture(&mut state);
            assert!(guard.is_preserving());
            plotted(&mut guard);
            assert_eq!(guard.margins, Margins::zero());
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_passthrough_keeps_changes() {
        let mut state = DisplayState::default();
        {
            let mut guard = StateGuard::new(&mut state, false);
            assert!(!guard.is_preserving());
            plotted(&mut guard);
        }
        assert_eq!(state.margins, Margins::zero());
    }

    #[test]
    fn test_capture_restores_during_unwind() {
        let mut state = DisplayState::default();
        state.extra.insert("dpi".to_string(), Value::from(96));
        let before = state.clone();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = StateGuard::capture(&mut state);
            guard.margins = Margins::zero();
            panic!("renderer blew up");
        }));

        assert!(result.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_state_serde_keeps_extra_keys() {
        let json = r#"{"background":[0,0,0],"dpi":300}"#;
        let state: DisplayState = serde_json::from_str(json).unwrap();
        assert_eq!(state.background, [0, 0, 0]);
        assert_eq!(state.margins, Margins::default());
        assert_eq!(state.extra.get("dpi"), Some(&Value::from(300)));
    }
}

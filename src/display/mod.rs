mod headless;
mod pixel_buffer;
mod state;
#[cfg(feature = "sdl")]
mod window;

pub use headless::{Frame, HeadlessRenderer};
pub use pixel_buffer::{channel_to_u8, fit_rect, FitRect, PixelBuffer};
pub use state::{DisplayState, Margins, StateGuard};
#[cfg(feature = "sdl")]
pub use window::WindowRenderer;

use crate::error::{PlotWarning, RenderError, Result};
use crate::raster::{PixelArray, RasterImage, Rotation};
use log::{debug, warn};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

/// Value that maps to full channel intensity. Inputs are expected in [0, 1].
pub const CHANNEL_SCALE: f64 = 1.0;

// ============================================================================
// Options
// ============================================================================

/// Renderer options carried through a display call untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Smooth between cells instead of drawing hard-edged blocks
    pub interpolate: bool,
    /// Colour behind the raster and in place of NaN cells
    pub background: Option<[u8; 3]>,
    pub title: Option<String>,
    /// Anything else, for renderers that understand it
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DisplayOptions {
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Arguments of a display call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotParams {
    /// Degrees; one of 0, 90, 180, 270
    pub rotation: i32,
    /// On-screen height of one y unit relative to one x unit
    pub aspect: f64,
    /// Put the display state back the way it was once the call returns
    pub preserve_state: bool,
    pub options: DisplayOptions,
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            rotation: 0,
            aspect: 1.0,
            preserve_state: false,
            options: DisplayOptions::default(),
        }
    }
}

impl PlotParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse parameters from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_aspect(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn preserving_state(mut self, preserve: bool) -> Self {
        self.preserve_state = preserve;
        self
    }

    pub fn with_options(mut self, options: DisplayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.extra.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Everything a renderer gets for one raster
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub image: &'a RasterImage,
    /// Channel value drawn at full intensity
    pub scale: f64,
    pub aspect: f64,
    /// Draw at most this many cells; larger rasters may be subsampled
    pub max_pixels: usize,
    pub options: &'a DisplayOptions,
}

/// What a renderer reports after a successful draw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Benign diagnostics; the display call logs these at debug level only
    pub warnings: Vec<String>,
}

/// A surface that can show a raster.
pub trait Renderer {
    /// Draw `request.image` and update `state` to describe the new plot.
    fn draw_raster(
        &mut self,
        state: &mut DisplayState,
        request: &RenderRequest<'_>,
    ) -> std::result::Result<RenderOutcome, RenderError>;
}

/// Checks shared by the bundled renderers.
pub fn validate_request(request: &RenderRequest<'_>) -> std::result::Result<(), RenderError> {
    if !request.aspect.is_finite() || request.aspect <= 0.0 {
        return Err(RenderError::InvalidAspect(request.aspect));
    }
    if !request.scale.is_finite() || request.scale <= 0.0 {
        return Err(RenderError::InvalidScale(request.scale));
    }
    if let Some(title) = &request.options.title {
        if title.contains('\0') {
            return Err(RenderError::InvalidOption {
                key: "title".to_string(),
                reason: "contains a NUL byte".to_string(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// display
// ============================================================================

/// What a display call did
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySummary {
    /// Rotation actually applied
    pub rotation: Rotation,
    /// Raster size handed to the renderer, after rotation
    pub width: usize,
    pub height: usize,
    pub warnings: Vec<PlotWarning>,
    /// Renderer warnings that were logged at debug level and dropped
    pub suppressed_warnings: usize,
}

/// Rotate and draw an array of unknown rank.
///
/// `pixels` must be a 2D intensity matrix or a `rows x cols x 3` RGB array
/// with values in [0, 1]. A rotation outside {0, 90, 180, 270} is reported
/// as a warning and treated as 0. Any other rank, or an empty array, fails
/// with `PlotError::InvalidShape` before the renderer is touched.
///
/// With `params.preserve_state`, `state` is snapshotted before drawing and
/// restored on the way out, whether the renderer succeeded or not.
pub fn display(
    renderer: &mut dyn Renderer,
    state: &mut DisplayState,
    pixels: &ArrayD<f64>,
    params: &PlotParams,
) -> Result<DisplaySummary> {
    let mut warnings = Vec::new();
    let rotation = resolve_rotation(params.rotation, &mut warnings);
    let pixels = PixelArray::from_dyn(pixels.view())?;
    render(renderer, state, &pixels, rotation, params, warnings)
}

/// Rotate and draw an already classified pixel array.
pub fn display_pixels(
    renderer: &mut dyn Renderer,
    state: &mut DisplayState,
    pixels: &PixelArray,
    params: &PlotParams,
) -> Result<DisplaySummary> {
    let mut warnings = Vec::new();
    let rotation = resolve_rotation(params.rotation, &mut warnings);
    render(renderer, state, pixels, rotation, params, warnings)
}

fn resolve_rotation(degrees: i32, warnings: &mut Vec<PlotWarning>) -> Rotation {
    Rotation::from_degrees(degrees).unwrap_or_else(|| {
        let warning = PlotWarning::InvalidRotation { degrees };
        warn!("{}", warning);
        warnings.push(warning);
        Rotation::Deg0
    })
}

fn render(
    renderer: &mut dyn Renderer,
    state: &mut DisplayState,
    pixels: &PixelArray,
    rotation: Rotation,
    params: &PlotParams,
    warnings: Vec<PlotWarning>,
) -> Result<DisplaySummary> {
    let mut guard = StateGuard::new(state, params.preserve_state);

    let image = pixels.to_raster(rotation);
    debug!(
        "drawing rank-{} input {:?} as {}x{} raster, rotated {} degrees",
        pixels.rank(),
        pixels.dim(),
        image.width(),
        image.height(),
        rotation.degrees()
    );

    let request = RenderRequest {
        image: &image,
        scale: CHANNEL_SCALE,
        aspect: params.aspect,
        max_pixels: image.pixel_count(),
        options: &params.options,
    };
    let outcome = renderer.draw_raster(&mut guard, &request)?;
    for message in &outcome.warnings {
        debug!("suppressed renderer warning: {}", message);
    }

    Ok(DisplaySummary {
        rotation,
        width: image.width(),
        height: image.height(),
        warnings,
        suppressed_warnings: outcome.warnings.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_plot_params_defaults() {
        let params = PlotParams::default();
        assert_eq!(params.rotation, 0);
        assert_eq!(params.aspect, 1.0);
        assert!(!params.preserve_state);
        assert_eq!(params.options, DisplayOptions::default());
    }

    #[test]
    fn test_plot_params_from_json_keeps_unknown_options() {
        let params = PlotParams::from_json(
            r#"{"rotation": 90, "options": {"interpolate": true, "legend": false, "zlim": [0, 1]}}"#,
        )
        .unwrap();
        assert_eq!(params.rotation, 90);
        assert_eq!(params.aspect, 1.0);
        assert!(params.options.interpolate);
        assert_eq!(params.options.extra.get("legend"), Some(&Value::Bool(false)));
        assert!(params.options.extra.contains_key("zlim"));
    }

    #[test]
    fn test_plot_params_from_bad_json() {
        assert!(matches!(
            PlotParams::from_json(r#"{"rotation": "sideways"}"#),
            Err(crate::PlotError::Config(_))
        ));
    }

    #[test]
    fn test_builder() {
        let params = PlotParams::new()
            .with_rotation(180)
            .with_aspect(2.0)
            .preserving_state(true)
            .with_option("maxcell", 100);
        assert_eq!(params.rotation, 180);
        assert_eq!(params.aspect, 2.0);
        assert!(params.preserve_state);
        assert_eq!(params.options.extra.get("maxcell"), Some(&Value::from(100)));
    }

    #[test]
    fn test_validate_request() {
        let image = RasterImage::from_channels(Array3::zeros((2, 2, 3)));
        let options = DisplayOptions::default();
        let request = RenderRequest {
            image: &image,
            scale: 1.0,
            aspect: 1.0,
            max_pixels: 4,
            options: &options,
        };
        assert!(validate_request(&request).is_ok());
        assert_eq!(
            validate_request(&RenderRequest { aspect: 0.0, ..request }),
            Err(RenderError::InvalidAspect(0.0))
        );
        assert!(matches!(
            validate_request(&RenderRequest { aspect: f64::NAN, ..request }),
            Err(RenderError::InvalidAspect(_))
        ));
        assert_eq!(
            validate_request(&RenderRequest { scale: -1.0, ..request }),
            Err(RenderError::InvalidScale(-1.0))
        );

        let bad_title = DisplayOptions {
            title: Some("a\0b".to_string()),
            ..DisplayOptions::default()
        };
        assert!(matches!(
            validate_request(&RenderRequest { options: &bad_title, ..request }),
            Err(RenderError::InvalidOption { .. })
        ));
    }
}

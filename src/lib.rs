//! Show elevation and hillshade rasters on a display surface.
//!
//! Input is either a single-channel matrix (an elevation or hillshade grid)
//! or a `rows x cols x 3` RGB array with values in [0, 1]. [`display()`]
//! optionally rotates it by a multiple of 90 degrees, brings it into screen
//! orientation, and hands a three-channel [`RasterImage`] to a
//! [`Renderer`].
//!
//! ```
//! use ndarray::Array2;
//! use reliefview::{display, DisplayState, HeadlessRenderer, PlotParams};
//!
//! let hillshade = Array2::<f64>::from_elem((120, 80), 0.5).into_dyn();
//! let mut renderer = HeadlessRenderer::new();
//! let mut state = DisplayState::default();
//! let params = PlotParams::new().with_rotation(90).preserving_state(true);
//!
//! let summary = display(&mut renderer, &mut state, &hillshade, &params).unwrap();
//! assert_eq!((summary.width, summary.height), (80, 120));
//! assert_eq!(state, DisplayState::default());
//! ```
//!
//! Renderers:
//!
//! - [`HeadlessRenderer`] draws into memory and keeps every frame.
//! - `WindowRenderer` (feature `sdl`) draws into an SDL2 window.

pub mod display;
pub mod error;
pub mod raster;

pub use display::{
    display, display_pixels, DisplayOptions, DisplayState, DisplaySummary, Frame,
    HeadlessRenderer, PixelBuffer, PlotParams, RenderOutcome, RenderRequest, Renderer, StateGuard,
};
#[cfg(feature = "sdl")]
pub use display::WindowRenderer;
pub use error::{PlotError, PlotWarning, RenderError, Result};
pub use raster::{Extent, PixelArray, RasterImage, Rotation};

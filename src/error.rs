//! Error and warning types
//!
//! Fatal problems are `PlotError`s and abort the call before anything is
//! drawn. Problems the caller can live with are `PlotWarning`s: they are
//! logged and reported back in the `DisplaySummary`, and the call goes on.

use thiserror::Error;

/// Errors raised by a renderer while drawing a raster.
///
/// These are passed back to the caller untouched, wrapped in
/// `PlotError::Render`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// Aspect ratio must be finite and positive
    #[error("invalid aspect ratio: {0}")]
    InvalidAspect(f64),

    /// Channel scale must be finite and positive
    #[error("invalid channel scale: {0}")]
    InvalidScale(f64),

    /// A display option the renderer cannot honour
    #[error("invalid display option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// Failure inside the drawing backend (window system, texture upload...)
    #[error("renderer backend error: {0}")]
    Backend(String),
}

/// Errors that stop a display call.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Input is not a non-empty 2D matrix or rows x cols x 3 array
    #[error("invalid pixel array shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },

    /// The renderer refused or failed to draw
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Plot parameters could not be parsed
    #[error("invalid plot parameters: {0}")]
    Config(#[from] serde_json::Error),
}

impl PlotError {
    pub(crate) fn invalid_shape(shape: &[usize], reason: impl Into<String>) -> Self {
        PlotError::InvalidShape {
            shape: shape.to_vec(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal conditions reported by a display call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlotWarning {
    /// Rotation was not one of 0, 90, 180 or 270; the raster was drawn unrotated
    #[error("rotation of {degrees} degrees is not a multiple of 90 in [0, 270]; drawing unrotated")]
    InvalidRotation { degrees: i32 },
}

/// Type alias for Results using PlotError
pub type Result<T> = std::result::Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_message_names_shape() {
        let err = PlotError::invalid_shape(&[4, 4, 4, 4], "neither array nor matrix");
        let msg = err.to_string();
        assert!(msg.contains("[4, 4, 4, 4]"), "{}", msg);
        assert!(msg.contains("neither array nor matrix"), "{}", msg);
    }

    #[test]
    fn test_render_error_is_transparent() {
        let err = PlotError::from(RenderError::InvalidAspect(-1.0));
        assert_eq!(err.to_string(), "invalid aspect ratio: -1");
    }
}

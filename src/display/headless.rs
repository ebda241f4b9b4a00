//! Off-screen renderer.
//!
//! Draws into an in-memory `PixelBuffer` and keeps every frame, so display
//! calls can be inspected without a window system.

use super::{
    validate_request, DisplayOptions, DisplayState, PixelBuffer, RenderOutcome, RenderRequest,
    Renderer, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use crate::error::RenderError;
use crate::raster::RasterImage;
use log::{debug, trace};

/// One raster as the headless renderer received and drew it
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raster after subsampling to the request's pixel limit
    pub image: RasterImage,
    pub scale: f64,
    pub aspect: f64,
    pub max_pixels: usize,
    pub options: DisplayOptions,
    pub buffer: PixelBuffer,
}

pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    frames: Vec<Frame>,
    failure: Option<String>,
    benign_warnings: Vec<String>,
}

impl HeadlessRenderer {
    /// Create a renderer with default surface size (640x480)
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a renderer with custom surface size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
            failure: None,
            benign_warnings: Vec::new(),
        }
    }

    /// Fail every following draw with a backend error, after the display
    /// state has already been set up for the plot.
    pub fn fail_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Report this diagnostic with every successful draw
    pub fn with_benign_warning(mut self, message: impl Into<String>) -> Self {
        self.benign_warnings.push(message.into());
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn draw_raster(
        &mut self,
        state: &mut DisplayState,
        request: &RenderRequest<'_>,
    ) -> Result<RenderOutcome, RenderError> {
        validate_request(request)?;

        let image = request.image.decimated(request.max_pixels);
        state.begin_raster_plot(image.extent(), request.options);

        if let Some(reason) = &self.failure {
            debug!("HeadlessRenderer: failing draw: {}", reason);
            return Err(RenderError::Backend(reason.clone()));
        }

        let mut buffer = PixelBuffer::with_size(self.width, self.height);
        let rect = buffer.draw_raster(
            &image,
            request.scale,
            request.aspect,
            request.options.interpolate,
            state.background,
        );
        trace!(
            "HeadlessRenderer: {}x{} raster into {:?}",
            image.width(),
            image.height(),
            rect
        );

        self.frames.push(Frame {
            image,
            scale: request.scale,
            aspect: request.aspect,
            max_pixels: request.max_pixels,
            options: request.options.clone(),
            buffer,
        });

        Ok(RenderOutcome {
            warnings: self.benign_warnings.clone(),
        })
    }
}

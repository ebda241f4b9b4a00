//! SDL2 window renderer.
//!
//! Opens one window and draws each raster into it through a streaming
//! RGBA8888 texture. The window stays up until it is dropped; call
//! `wait_for_close` to block until the user closes it.

use super::{
    validate_request, DisplayState, PixelBuffer, RenderOutcome, RenderRequest, Renderer,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use crate::error::RenderError;
use log::{debug, info};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::EventPump;

fn backend<E: ToString>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

pub struct WindowRenderer {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
    last_frame: Option<PixelBuffer>,
}

impl WindowRenderer {
    /// Open a window with default resolution (640x480)
    pub fn new(title: &str) -> Result<Self, RenderError> {
        Self::with_size(title, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Open a window with custom resolution
    pub fn with_size(title: &str, width: u32, height: u32) -> Result<Self, RenderError> {
        let sdl_context = sdl2::init().map_err(backend)?;
        let video_subsystem = sdl_context.video().map_err(backend)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(backend)?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(backend)?;
        let event_pump = sdl_context.event_pump().map_err(backend)?;

        info!("WindowRenderer: opened {}x{} window '{}'", width, height, title);
        Ok(Self {
            canvas,
            event_pump,
            width,
            height,
            last_frame: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn present(&mut self, buffer: &PixelBuffer) -> Result<(), RenderError> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, buffer.width(), buffer.height())
            .map_err(backend)?;
        texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(backend)?;

        self.canvas.copy(&texture, None, None).map_err(backend)?;
        self.canvas.present();
        Ok(())
    }

    /// Block until the window is closed or Escape is pressed, redrawing the
    /// last frame whenever the window system asks for it.
    pub fn wait_for_close(&mut self) -> Result<(), RenderError> {
        loop {
            let event = self.event_pump.wait_event();
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    info!("WindowRenderer: closed");
                    return Ok(());
                },
                Event::Window {
                    win_event: WindowEvent::Exposed,
                    ..
                } => {
                    if let Some(buffer) = self.last_frame.take() {
                        let presented = self.present(&buffer);
                        self.last_frame = Some(buffer);
                        presented?;
                    }
                },
                _ => {},
            }
        }
    }
}

impl Renderer for WindowRenderer {
    fn draw_raster(
        &mut self,
        state: &mut DisplayState,
        request: &RenderRequest<'_>,
    ) -> Result<RenderOutcome, RenderError> {
        validate_request(request)?;

        let image = request.image.decimated(request.max_pixels);
        state.begin_raster_plot(image.extent(), request.options);

        let mut warnings = Vec::new();
        if let Some(title) = &state.title {
            self.canvas
                .window_mut()
                .set_title(title)
                .map_err(|e| RenderError::InvalidOption {
                    key: "title".to_string(),
                    reason: e.to_string(),
                })?;
        }
        if !request.options.extra.is_empty() {
            // Extra keys are meant for other backends
            warnings.push(format!(
                "ignoring options not understood by the SDL backend: {:?}",
                request.options.extra.keys().collect::<Vec<_>>()
            ));
        }

        let mut buffer = PixelBuffer::with_size(self.width, self.height);
        let rect = buffer.draw_raster(
            &image,
            request.scale,
            request.aspect,
            request.options.interpolate,
            state.background,
        );
        debug!(
            "WindowRenderer: {}x{} raster into {:?}",
            image.width(),
            image.height(),
            rect
        );

        self.present(&buffer)?;
        self.last_frame = Some(buffer);

        Ok(RenderOutcome { warnings })
    }
}

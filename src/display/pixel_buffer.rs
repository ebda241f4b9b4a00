use crate::raster::RasterImage;

// ============================================================================
// Utility Functions
// ============================================================================

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// Map a channel value onto 0..=255 given the value that means full intensity.
/// NaN has no colour and returns None.
#[inline]
pub fn channel_to_u8(value: f64, scale: f64) -> Option<u8> {
    if value.is_nan() {
        return None;
    }
    Some(((value / scale).clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Bilinear blend of four neighbours; `fx`, `fy` in [0, 1]
#[inline]
fn bilinear(v00: f64, v10: f64, v01: f64, v11: f64, fx: f64, fy: f64) -> f64 {
    let top = v00 + (v10 - v00) * fx;
    let bottom = v01 + (v11 - v01) * fx;
    top + (bottom - top) * fy
}

// ============================================================================
// FitRect
// ============================================================================

/// Destination rectangle of a raster inside the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Largest rectangle with the raster's proportions that fits the surface,
/// centred. `aspect` is the on-screen height of one y unit relative to one
/// x unit.
pub fn fit_rect(
    surface_w: u32,
    surface_h: u32,
    extent_w: f64,
    extent_h: f64,
    aspect: f64,
) -> FitRect {
    let data_w = extent_w;
    let data_h = extent_h * aspect;
    let zoom = (surface_w as f64 / data_w).min(surface_h as f64 / data_h);

    let w = ((data_w * zoom).round() as u32).clamp(1, surface_w.max(1));
    let h = ((data_h * zoom).round() as u32).clamp(1, surface_h.max(1));
    FitRect {
        x: (surface_w.saturating_sub(w)) / 2,
        y: (surface_h.saturating_sub(h)) / 2,
        w,
        h,
    }
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
/// Rasters are scaled into this and the bytes go to the window backend as-is.
#[derive(Clone)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a new pixel buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Clear to a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            write_pixel(pixel, r, g, b);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Get pixel color (bounds checked)
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            // ABGR layout: [0]=A, [1]=B, [2]=G, [3]=R
            Some((self.pixels[idx + 3], self.pixels[idx + 2], self.pixels[idx + 1]))
        } else {
            None
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    // ========================================================================
    // Raster drawing
    // ========================================================================

    /// Scale a raster into the buffer, letterboxed to keep its proportions.
    ///
    /// Channel values are divided by `scale`, so `scale` is the value drawn
    /// at full intensity. Cells holding NaN keep the `background` colour.
    /// Everything outside the fitted rectangle is cleared to `background`.
    pub fn draw_raster(
        &mut self,
        image: &RasterImage,
        scale: f64,
        aspect: f64,
        interpolate: bool,
        background: [u8; 3],
    ) -> FitRect {
        let [bg_r, bg_g, bg_b] = background;
        self.clear(bg_r, bg_g, bg_b);

        let extent = image.extent();
        let rect = fit_rect(self.width, self.height, extent.width(), extent.height(), aspect);
        let cols = image.width();
        let rows = image.height();
        if cols == 0 || rows == 0 {
            return rect;
        }

        let col_step = cols as f64 / rect.w as f64;
        let row_step = rows as f64 / rect.h as f64;

        for dy in 0..rect.h {
            // Sample at the centre of each destination pixel
            let src_y = (dy as f64 + 0.5) * row_step;
            for dx in 0..rect.w {
                let src_x = (dx as f64 + 0.5) * col_step;
                let rgb = if interpolate {
                    sample_bilinear(image, src_x - 0.5, src_y - 0.5)
                } else {
                    sample_nearest(image, src_x, src_y)
                };

                let color = rgb.and_then(|[r, g, b]| {
                    Some((
                        channel_to_u8(r, scale)?,
                        channel_to_u8(g, scale)?,
                        channel_to_u8(b, scale)?,
                    ))
                });
                if let Some((r, g, b)) = color {
                    self.set_pixel((rect.x + dx) as i32, (rect.y + dy) as i32, r, g, b);
                }
            }
        }

        rect
    }
}

fn sample_nearest(image: &RasterImage, x: f64, y: f64) -> Option<[f64; 3]> {
    let col = (x.floor() as usize).min(image.width() - 1);
    let row = (y.floor() as usize).min(image.height() - 1);
    image.pixel(row, col)
}

fn sample_bilinear(image: &RasterImage, x: f64, y: f64) -> Option<[f64; 3]> {
    let max_col = image.width() - 1;
    let max_row = image.height() - 1;
    let x = x.clamp(0.0, max_col as f64);
    let y = y.clamp(0.0, max_row as f64);

    let c0 = x.floor() as usize;
    let r0 = y.floor() as usize;
    let c1 = (c0 + 1).min(max_col);
    let r1 = (r0 + 1).min(max_row);
    let fx = x - c0 as f64;
    let fy = y - r0 as f64;

    let p00 = image.pixel(r0, c0)?;
    let p10 = image.pixel(r0, c1)?;
    let p01 = image.pixel(r1, c0)?;
    let p11 = image.pixel(r1, c1)?;

    let mut out = [0.0; 3];
    for (k, value) in out.iter_mut().enumerate() {
        *value = bilinear(p00[k], p10[k], p01[k], p11[k], fx, fy);
    }
    Some(out)
}

//! Pixel arrays and display rasters
//!
//! A `PixelArray` is what callers hand in: a single-channel elevation or
//! hillshade matrix, or a `rows x cols x 3` RGB array. A `RasterImage` is
//! what renderers receive: always three channels, already rotated and
//! oriented, with its spatial extent attached.

mod rotate;

pub use rotate::{
    orient_south_up, quarter_turn, replicate_channels, rotate_channels, rotate_plane, Rotation,
};

use crate::error::{PlotError, Result};
use ndarray::{s, Array2, Array3, ArrayD, ArrayView2, ArrayViewD, Axis, Ix2, Ix3};
use serde::{Deserialize, Serialize};

/// Number of colour channels in a display raster
pub const RGB_CHANNELS: usize = 3;

// ============================================================================
// Extent
// ============================================================================

/// Spatial extent of a raster in user coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    /// Extent that centres every pixel on an integer coordinate:
    /// `[0.5, width + 0.5] x [0.5, height + 0.5]`.
    pub fn pixel_centered(width: usize, height: usize) -> Self {
        Self {
            xmin: 0.5,
            xmax: width as f64 + 0.5,
            ymin: 0.5,
            ymax: height as f64 + 0.5,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

// ============================================================================
// PixelArray
// ============================================================================

/// Caller-supplied image data.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelArray {
    /// Single intensity channel, indexed as an elevation matrix
    Matrix(Array2<f64>),
    /// Red, green and blue planes stacked on the last axis
    Rgb(Array3<f64>),
}

impl PixelArray {
    /// Wrap a single-channel matrix. Empty matrices are rejected.
    pub fn from_matrix(matrix: Array2<f64>) -> Result<Self> {
        ensure_not_empty(matrix.shape())?;
        Ok(PixelArray::Matrix(matrix))
    }

    /// Wrap an RGB array. The last axis must hold exactly three channels.
    pub fn from_rgb(pixels: Array3<f64>) -> Result<Self> {
        ensure_not_empty(pixels.shape())?;
        if pixels.len_of(Axis(2)) != RGB_CHANNELS {
            return Err(PlotError::invalid_shape(
                pixels.shape(),
                format!(
                    "expected {} channels, found {}",
                    RGB_CHANNELS,
                    pixels.len_of(Axis(2))
                ),
            ));
        }
        Ok(PixelArray::Rgb(pixels))
    }

    /// Classify an array of unknown rank.
    pub fn from_dyn(pixels: ArrayViewD<'_, f64>) -> Result<Self> {
        let shape = pixels.shape().to_vec();
        match pixels.ndim() {
            2 => {
                let matrix = pixels
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| PlotError::invalid_shape(&shape, e.to_string()))?;
                Self::from_matrix(matrix.to_owned())
            },
            3 => {
                let rgb = pixels
                    .into_dimensionality::<Ix3>()
                    .map_err(|e| PlotError::invalid_shape(&shape, e.to_string()))?;
                Self::from_rgb(rgb.to_owned())
            },
            _ => Err(PlotError::invalid_shape(&shape, "neither array nor matrix")),
        }
    }

    /// 2 for a matrix, 3 for an RGB array
    pub fn rank(&self) -> usize {
        match self {
            PixelArray::Matrix(_) => 2,
            PixelArray::Rgb(_) => 3,
        }
    }

    /// (rows, cols) of the input, before any rotation
    pub fn dim(&self) -> (usize, usize) {
        match self {
            PixelArray::Matrix(m) => m.dim(),
            PixelArray::Rgb(p) => {
                let (rows, cols, _) = p.dim();
                (rows, cols)
            },
        }
    }

    /// Rotate and orient into a display raster.
    ///
    /// RGB arrays are rotated channel by channel. Matrices are rotated, then
    /// brought into display orientation, then replicated into three channels.
    pub fn to_raster(&self, rotation: Rotation) -> RasterImage {
        let turns = rotation.quarter_turns();
        let pixels = match self {
            PixelArray::Rgb(rgb) => rotate_channels(rgb.view(), turns),
            PixelArray::Matrix(matrix) => {
                let rotated = rotate_plane(matrix.view(), turns);
                let oriented = orient_south_up(rotated.view());
                replicate_channels(oriented.view())
            },
        };
        RasterImage::from_channels(pixels)
    }
}

impl TryFrom<ArrayD<f64>> for PixelArray {
    type Error = PlotError;

    fn try_from(pixels: ArrayD<f64>) -> Result<Self> {
        PixelArray::from_dyn(pixels.view())
    }
}

impl TryFrom<&ArrayD<f64>> for PixelArray {
    type Error = PlotError;

    fn try_from(pixels: &ArrayD<f64>) -> Result<Self> {
        PixelArray::from_dyn(pixels.view())
    }
}

fn ensure_not_empty(shape: &[usize]) -> Result<()> {
    if shape.iter().any(|&len| len == 0) {
        return Err(PlotError::invalid_shape(shape, "array has a zero-length dimension"));
    }
    Ok(())
}

// ============================================================================
// RasterImage
// ============================================================================

/// Three-channel raster ready for a renderer.
///
/// Row 0 is the top screen line. Cell `(row, col)` is centred at
/// `(col + 1, height - row)` in extent coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: Array3<f64>,
    extent: Extent,
}

impl RasterImage {
    /// Wrap `rows x cols x 3` pixel data with a pixel-centred extent.
    pub fn from_channels(pixels: Array3<f64>) -> Self {
        let (rows, cols, _) = pixels.dim();
        Self {
            extent: Extent::pixel_centered(cols, rows),
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.len_of(Axis(1))
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.len_of(Axis(0))
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn pixels(&self) -> &Array3<f64> {
        &self.pixels
    }

    pub fn channel(&self, channel: usize) -> ArrayView2<'_, f64> {
        self.pixels.index_axis(Axis(2), channel)
    }

    /// RGB values at (row, col), or None when out of bounds
    pub fn pixel(&self, row: usize, col: usize) -> Option<[f64; 3]> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        Some([
            self.pixels[[row, col, 0]],
            self.pixels[[row, col, 1]],
            self.pixels[[row, col, 2]],
        ])
    }

    /// Centre of cell (row, col) in extent coordinates
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let cell_w = self.extent.width() / self.width() as f64;
        let cell_h = self.extent.height() / self.height() as f64;
        (
            self.extent.xmin + (col as f64 + 0.5) * cell_w,
            self.extent.ymax - (row as f64 + 0.5) * cell_h,
        )
    }

    /// Regular subsample holding at most `max_pixels` cells.
    ///
    /// Keeps every n-th row and column. The extent is unchanged, so the
    /// coarser cells cover the same ground.
    pub fn decimated(&self, max_pixels: usize) -> RasterImage {
        let count = self.pixel_count();
        if max_pixels == 0 || count <= max_pixels {
            return self.clone();
        }

        let mut step = (count as f64 / max_pixels as f64).sqrt().ceil() as usize;
        while self.height().div_ceil(step) * self.width().div_ceil(step) > max_pixels {
            step += 1;
        }

        let step = step as isize;
        RasterImage {
            pixels: self.pixels.slice(s![..;step, ..;step, ..]).to_owned(),
            extent: self.extent,
        }
    }
}

use image::imageops::{self, FilterType};
use thiserror::Error;

use crate::canvas::RasterImage;

/// Edge of the square grid the raster is downsampled to (MNIST-sized).
pub const GRID_SIZE: usize = 28;
pub const VECTOR_LEN: usize = GRID_SIZE * GRID_SIZE;

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
    #[error("intensity vector must have {VECTOR_LEN} values, got {0}")]
    WrongLength(usize),
    #[error("intensity at index {index} is outside [0, 1]: {value}")]
    OutOfRange { index: usize, value: f32 },
}

/// Row-major 28x28 ink intensities: 0 is background, 1 is solid ink.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityVector {
    values: Vec<f32>,
}

impl IntensityVector {
    pub fn from_values(values: Vec<f32>) -> Result<Self, PreprocessError> {
        if values.len() != VECTOR_LEN {
            return Err(PreprocessError::WrongLength(values.len()));
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(PreprocessError::OutOfRange { index, value });
        }
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * GRID_SIZE + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(GRID_SIZE)
    }
}

/// Downsamples the raster to 28x28 with a bilinear filter, averages RGB into
/// gray and inverts so light background maps to 0 and dark ink to 1. Alpha is
/// ignored.
pub fn normalize(raster: &RasterImage) -> Result<IntensityVector, PreprocessError> {
    if raster.is_empty() {
        return Err(PreprocessError::EmptyRaster {
            width: raster.width(),
            height: raster.height(),
        });
    }

    let grid = imageops::resize(
        raster.pixels(),
        GRID_SIZE as u32,
        GRID_SIZE as u32,
        FilterType::Triangle,
    );

    let values = grid
        .pixels()
        .map(|pixel| {
            let [r, g, b, _] = pixel.0;
            let gray = (r as f32 + g as f32 + b as f32) / 3.0;
            (1.0 - gray / 255.0).clamp(0.0, 1.0)
        })
        .collect();

    Ok(IntensityVector { values })
}

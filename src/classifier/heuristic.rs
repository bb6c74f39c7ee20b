//! Local fallback used when the remote classifier is unavailable.
//!
//! This is a crude heuristic, not a statistical classifier: it compares ink
//! mass between grid halves and maps a few lopsided shapes to a guess. It
//! only exists so the app still answers something while offline.

use crate::canvas::RasterImage;
use crate::preprocess::{normalize, IntensityVector, GRID_SIZE};

use super::{ClassLabel, ClassificationStrategy, ClassifyError, Verdict};

const HALF: usize = GRID_SIZE / 2;

/// Ink mass per grid half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSums {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl RegionSums {
    pub fn from_intensities(vector: &IntensityVector) -> Self {
        let mut sums = RegionSums {
            top: 0.0,
            bottom: 0.0,
            left: 0.0,
            right: 0.0,
        };

        for (row, values) in vector.rows().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                let value = value as f64;
                if row < HALF {
                    sums.top += value;
                } else {
                    sums.bottom += value;
                }
                if col < HALF {
                    sums.left += value;
                } else {
                    sums.right += value;
                }
            }
        }
        sums
    }

    /// First matching rule wins.
    pub fn decide(&self) -> (ClassLabel, f64) {
        let (digit, confidence) = if self.top > self.bottom * 2.0 {
            (7, 0.6)
        } else if self.left > self.right * 1.5 {
            (1, 0.5)
        } else if (self.top - self.bottom).abs() < 10.0 {
            (0, 0.4)
        } else {
            (0, 0.3)
        };
        (ClassLabel(digit), confidence)
    }
}

pub fn classify_intensities(vector: &IntensityVector) -> Verdict {
    let (label, confidence) = RegionSums::from_intensities(vector).decide();
    Verdict::new(label, confidence)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicStrategy;

impl ClassificationStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn classify(&self, raster: &RasterImage) -> Result<Verdict, ClassifyError> {
        let vector = normalize(raster)?;
        Ok(classify_intensities(&vector))
    }
}

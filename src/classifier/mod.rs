pub mod boundary;
pub mod distribution;
pub mod error;
pub mod gemini;
pub mod heuristic;
pub mod response;
pub mod strategy;
pub mod types;

pub use boundary::ClassificationBoundary;
pub use distribution::synthesize_distribution;
pub use error::ClassifyError;
pub use gemini::GeminiStrategy;
pub use heuristic::{HeuristicStrategy, RegionSums};
pub use strategy::ClassificationStrategy;
pub use types::{ClassLabel, ClassScore, ClassificationResult, InvalidLabel, Verdict};

/// The production pairing: Gemini first, the ink-mass heuristic as backup.
pub type DefaultBoundary = ClassificationBoundary<GeminiStrategy, HeuristicStrategy>;

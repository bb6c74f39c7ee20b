use rand::Rng;

use super::{ClassLabel, ClassScore};

/// Fills in the nine non-winning labels so the UI always has ten bars.
///
/// The winner keeps `confidence`. Each other label gets a uniform draw scaled
/// to at most `(1 - confidence) / 9`, so repeated calls with the same input
/// show different filler values. The list comes back sorted highest first.
pub fn synthesize_distribution<R: Rng + ?Sized>(
    winner: ClassLabel,
    confidence: f64,
    rng: &mut R,
) -> Vec<ClassScore> {
    let remaining = (1.0 - confidence).max(0.0);
    let cap = remaining / (ClassLabel::COUNT - 1) as f64;

    let mut scores: Vec<ClassScore> = ClassLabel::all()
        .map(|label| ClassScore {
            label,
            confidence: if label == winner {
                confidence
            } else {
                rng.gen::<f64>() * cap
            },
        })
        .collect();

    scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    scores
}

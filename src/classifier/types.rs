use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::distribution::synthesize_distribution;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("class label must be 0-9, got {0}")]
pub struct InvalidLabel(pub i64);

/// A digit class, 0 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ClassLabel(pub(super) u8);

impl ClassLabel {
    pub const COUNT: usize = 10;

    pub fn new(value: u8) -> Result<Self, InvalidLabel> {
        if (value as usize) < Self::COUNT {
            Ok(Self(value))
        } else {
            Err(InvalidLabel(value as i64))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = ClassLabel> {
        (0..Self::COUNT as u8).map(ClassLabel)
    }
}

impl TryFrom<u8> for ClassLabel {
    type Error = InvalidLabel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for ClassLabel {
    type Error = InvalidLabel;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| InvalidLabel(value))
            .and_then(Self::new)
    }
}

impl From<ClassLabel> for u8 {
    fn from(label: ClassLabel) -> Self {
        label.0
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a single strategy decided, before the per-class list is filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub label: ClassLabel,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

impl Verdict {
    pub fn new(label: ClassLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassScore {
    pub label: ClassLabel,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub id: Uuid,
    pub label: ClassLabel,
    pub confidence: f64,
    /// All ten labels, highest confidence first. The winner's entry always
    /// equals `confidence`; the rest are display filler, not probabilities.
    pub per_class_confidence: Vec<ClassScore>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ClassificationResult {
    pub fn from_verdict<R: Rng + ?Sized>(verdict: Verdict, rng: &mut R) -> Self {
        let per_class_confidence =
            synthesize_distribution(verdict.label, verdict.confidence, rng);
        Self {
            id: Uuid::new_v4(),
            label: verdict.label,
            confidence: verdict.confidence,
            per_class_confidence,
            timestamp: Utc::now(),
            reasoning: verdict.reasoning,
        }
    }

    pub fn confidence_for(&self, label: ClassLabel) -> Option<f64> {
        self.per_class_confidence
            .iter()
            .find(|score| score.label == label)
            .map(|score| score.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn labels_outside_range_are_rejected() {
        assert!(ClassLabel::new(9).is_ok());
        assert_eq!(ClassLabel::new(10), Err(InvalidLabel(10)));
        assert_eq!(ClassLabel::try_from(-1i64), Err(InvalidLabel(-1)));
        assert_eq!(ClassLabel::try_from(300i64), Err(InvalidLabel(300)));
        assert_eq!(ClassLabel::all().count(), 10);
    }

    #[test]
    fn label_deserialization_is_validated() {
        let ok: ClassLabel = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<ClassLabel>("12").is_err());
    }

    #[test]
    fn result_carries_winner_in_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let verdict = Verdict::new(ClassLabel::new(3).unwrap(), 0.72).with_reasoning("loop");
        let result = ClassificationResult::from_verdict(verdict, &mut rng);

        assert_eq!(result.per_class_confidence.len(), 10);
        assert_eq!(result.confidence_for(result.label), Some(0.72));
        assert_eq!(result.reasoning.as_deref(), Some("loop"));
    }

    #[test]
    fn serializes_camel_case_for_the_ui() {
        let mut rng = StdRng::seed_from_u64(1);
        let result =
            ClassificationResult::from_verdict(Verdict::new(ClassLabel::new(1).unwrap(), 0.5), &mut rng);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["label"], 1);
        assert!(json["perClassConfidence"].is_array());
        assert!(json.get("reasoning").is_none());
    }
}

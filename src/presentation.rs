use chrono::Local;
use serde::Serialize;

use crate::classifier::{ClassLabel, ClassificationResult};

/// Below this the UI shows a "low confidence" warning.
pub const LOW_CONFIDENCE_WARNING: f64 = 0.4;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceBand {
    VeryConfident,
    Confident,
    Moderate,
    Low,
}

impl ConfidenceBand {
    pub fn for_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceBand::VeryConfident
        } else if confidence >= 0.6 {
            ConfidenceBand::Confident
        } else if confidence >= 0.4 {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceBand::VeryConfident => "Very Confident",
            ConfidenceBand::Confident => "Confident",
            ConfidenceBand::Moderate => "Moderate",
            ConfidenceBand::Low => "Low Confidence",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBar {
    pub label: ClassLabel,
    pub percent: String,
    /// Bar width, 0-100.
    pub width: f64,
    pub is_winner: bool,
}

/// Everything the result panel draws for one classification.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionView {
    pub label: ClassLabel,
    pub confidence: f64,
    pub confidence_percent: String,
    pub band: ConfidenceBand,
    pub band_label: &'static str,
    pub reasoning: Option<String>,
    pub bars: Vec<ConfidenceBar>,
    pub low_confidence_warning: bool,
}

impl From<&ClassificationResult> for PredictionView {
    fn from(result: &ClassificationResult) -> Self {
        let band = ConfidenceBand::for_confidence(result.confidence);
        let bars = result
            .per_class_confidence
            .iter()
            .map(|score| ConfidenceBar {
                label: score.label,
                percent: percent(score.confidence),
                width: (score.confidence * 100.0).clamp(0.0, 100.0),
                is_winner: score.label == result.label,
            })
            .collect();

        Self {
            label: result.label,
            confidence: result.confidence,
            confidence_percent: percent(result.confidence),
            band,
            band_label: band.label(),
            reasoning: result.reasoning.clone(),
            bars,
            low_confidence_warning: result.confidence < LOW_CONFIDENCE_WARNING,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub id: String,
    pub label: ClassLabel,
    pub confidence_percent: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
}

impl From<&ClassificationResult> for HistoryEntryView {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            id: result.id.to_string(),
            label: result.label,
            confidence_percent: percent(result.confidence),
            time: result
                .timestamp
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
        }
    }
}

fn percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

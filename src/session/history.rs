use std::collections::VecDeque;

use crate::classifier::ClassificationResult;

pub const HISTORY_LIMIT: usize = 10;
/// Results at or below this confidence are shown but never remembered.
pub const MIN_ACCEPTED_CONFIDENCE: f64 = 0.1;

/// Most-recent-first list of accepted results for the current session.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: VecDeque<ClassificationResult>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `result` if it clears the acceptance threshold, evicting the
    /// oldest entry past the limit. Returns whether it was kept.
    pub fn push(&mut self, result: ClassificationResult) -> bool {
        if result.confidence <= MIN_ACCEPTED_CONFIDENCE {
            return false;
        }
        self.entries.push_front(result);
        self.entries.truncate(HISTORY_LIMIT);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ClassificationResult> {
        self.entries.front()
    }
}

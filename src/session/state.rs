use serde::{Deserialize, Serialize};

use crate::classifier::ClassificationResult;
use crate::presentation::{HistoryEntryView, PredictionView};

use super::history::HistoryLog;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// Nothing classified yet, or the last result was cleared.
    #[default]
    Idle,
    Processing,
    Ready,
}

/// What the front end needs to redraw the result panel from scratch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub prediction: Option<PredictionView>,
    pub history: Vec<HistoryEntryView>,
    pub latest_request_id: u64,
}

/// Current result, history and request bookkeeping.
///
/// Every stroke end takes a new request id. Only the holder of the latest id
/// may write the outcome, so a slow response can't overwrite a newer one.
/// Clear and Reset also bump the id, which orphans anything in flight.
#[derive(Debug, Default)]
pub struct SessionState {
    status: SessionStatus,
    current: Option<ClassificationResult>,
    history: HistoryLog,
    latest_request_id: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current(&self) -> Option<&ClassificationResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn latest_request_id(&self) -> u64 {
        self.latest_request_id
    }

    pub fn is_latest(&self, request_id: u64) -> bool {
        request_id == self.latest_request_id
    }

    pub fn begin_request(&mut self) -> u64 {
        self.latest_request_id += 1;
        self.status = SessionStatus::Processing;
        self.latest_request_id
    }

    /// Stores the result if `request_id` is still the latest. Returns `false`
    /// for a stale response, which is dropped untouched.
    pub fn complete_request(&mut self, request_id: u64, result: ClassificationResult) -> bool {
        if !self.is_latest(request_id) {
            return false;
        }
        self.history.push(result.clone());
        self.current = Some(result);
        self.status = SessionStatus::Ready;
        true
    }

    /// A failed request leaves no result behind and never touches history.
    pub fn fail_request(&mut self, request_id: u64) -> bool {
        if !self.is_latest(request_id) {
            return false;
        }
        self.current = None;
        self.status = SessionStatus::Idle;
        true
    }

    /// Drops the current result but keeps history.
    pub fn clear(&mut self) {
        self.latest_request_id += 1;
        self.current = None;
        self.status = SessionStatus::Idle;
    }

    pub fn reset(&mut self) {
        self.clear();
        self.history.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            prediction: self.current.as_ref().map(PredictionView::from),
            history: self.history_views(),
            latest_request_id: self.latest_request_id,
        }
    }

    pub fn history_views(&self) -> Vec<HistoryEntryView> {
        self.history.iter().map(HistoryEntryView::from).collect()
    }
}

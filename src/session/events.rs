use serde::Serialize;

use crate::presentation::{HistoryEntryView, PredictionView};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationStartedEvent {
    pub request_id: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCompletedEvent {
    pub request_id: u64,
    pub prediction: PredictionView,
    pub history: Vec<HistoryEntryView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationFailedEvent {
    pub request_id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClearedEvent {
    pub history_cleared: bool,
}

/// Serializes as the bare payload; the variant is carried by `name()`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SessionEvent {
    Started(ClassificationStartedEvent),
    Completed(ClassificationCompletedEvent),
    Failed(ClassificationFailedEvent),
    Cleared(SessionClearedEvent),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Started(_) => "classification-started",
            SessionEvent::Completed(_) => "classification-completed",
            SessionEvent::Failed(_) => "classification-failed",
            SessionEvent::Cleared(_) => "session-cleared",
        }
    }
}

/// Where the controller reports progress. The desktop build forwards to the
/// Tauri webview; tests record events in memory.
pub trait SessionEvents: Send + Sync + 'static {
    fn emit(&self, event: SessionEvent);
}

#[cfg(feature = "desktop")]
pub use desktop::TauriEvents;

#[cfg(feature = "desktop")]
mod desktop {
    use tauri::{AppHandle, Emitter};

    use super::{SessionEvent, SessionEvents};

    // Set to true to enable verbose logging in this module
    const ENABLE_LOGS: bool = true;

    use crate::log_error;

    pub struct TauriEvents {
        app_handle: AppHandle,
    }

    impl TauriEvents {
        pub fn new(app_handle: AppHandle) -> Self {
            Self { app_handle }
        }
    }

    impl SessionEvents for TauriEvents {
        fn emit(&self, event: SessionEvent) {
            if let Err(err) = self.app_handle.emit(event.name(), &event) {
                log_error!("failed to emit {}: {}", event.name(), err);
            }
        }
    }
}

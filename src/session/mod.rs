#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod events;
pub mod history;
pub mod state;

pub use controller::{PendingClassification, SessionController};
pub use events::{SessionEvent, SessionEvents};
pub use history::{HistoryLog, HISTORY_LIMIT, MIN_ACCEPTED_CONFIDENCE};
pub use state::{SessionSnapshot, SessionState, SessionStatus};

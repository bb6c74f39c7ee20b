use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::canvas::{DrawingSurface, PointerSample, RasterImage};
use crate::classifier::{ClassificationBoundary, ClassificationStrategy};
use crate::presentation::PredictionView;

use super::events::{
    ClassificationCompletedEvent, ClassificationFailedEvent, ClassificationStartedEvent,
    SessionClearedEvent, SessionEvent, SessionEvents,
};
use super::state::{SessionSnapshot, SessionState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// A classification spawned by a stroke end.
pub struct PendingClassification {
    pub request_id: u64,
    pub handle: JoinHandle<()>,
}

/// Owns the drawing surface and the session state, and runs one async
/// classification per stroke end.
pub struct SessionController<R, F> {
    state: Arc<Mutex<SessionState>>,
    surface: Arc<Mutex<DrawingSurface>>,
    boundary: Arc<ClassificationBoundary<R, F>>,
    events: Arc<dyn SessionEvents>,
    processing_delay: Duration,
}

impl<R, F> Clone for SessionController<R, F> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            surface: Arc::clone(&self.surface),
            boundary: Arc::clone(&self.boundary),
            events: Arc::clone(&self.events),
            processing_delay: self.processing_delay,
        }
    }
}

impl<R, F> SessionController<R, F>
where
    R: ClassificationStrategy,
    F: ClassificationStrategy,
{
    pub fn new(
        boundary: ClassificationBoundary<R, F>,
        events: Arc<dyn SessionEvents>,
        processing_delay: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            surface: Arc::new(Mutex::new(DrawingSurface::new())),
            boundary: Arc::new(boundary),
            events,
            processing_delay,
        }
    }

    pub async fn begin_stroke(&self, sample: PointerSample) -> Result<()> {
        self.surface
            .lock()
            .await
            .begin_stroke(sample)
            .context("failed to begin stroke")
    }

    pub async fn extend_stroke(&self, sample: PointerSample) -> Result<()> {
        self.surface
            .lock()
            .await
            .extend_stroke(sample)
            .context("failed to extend stroke")
    }

    /// Ends the stroke and starts classifying a snapshot of the canvas.
    /// `None` when no stroke was in progress.
    pub async fn end_stroke(&self) -> Option<PendingClassification> {
        let raster = self.surface.lock().await.end_stroke()?;
        let request_id = self.state.lock().await.begin_request();

        log_debug!("request {} started", request_id);
        self.events
            .emit(SessionEvent::Started(ClassificationStartedEvent { request_id }));

        let controller = self.clone();
        let handle = tokio::spawn(controller.process(request_id, raster));

        Some(PendingClassification { request_id, handle })
    }

    /// Outcome events go out while the state lock is held, so they can't
    /// interleave with a concurrent Clear or Reset.
    async fn process(self, request_id: u64, raster: RasterImage) {
        if !self.processing_delay.is_zero() {
            time::sleep(self.processing_delay).await;
        }

        if !self.state.lock().await.is_latest(request_id) {
            log_debug!("request {} superseded before classification", request_id);
            return;
        }

        let outcome = self.boundary.classify(&raster).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(result) => {
                let prediction = PredictionView::from(&result);
                if !state.complete_request(request_id, result) {
                    log_warn!(
                        "discarding stale result for request {} (latest is {})",
                        request_id,
                        state.latest_request_id()
                    );
                    return;
                }
                let history = state.history_views();

                log_info!(
                    "request {} -> digit {} ({})",
                    request_id,
                    prediction.label,
                    prediction.confidence_percent
                );
                self.events
                    .emit(SessionEvent::Completed(ClassificationCompletedEvent {
                        request_id,
                        prediction,
                        history,
                    }));
            }
            Err(err) => {
                log_error!("classification request {} failed: {}", request_id, err);
                if state.fail_request(request_id) {
                    self.events
                        .emit(SessionEvent::Failed(ClassificationFailedEvent {
                            request_id,
                            message: err.to_string(),
                        }));
                }
            }
        }
    }

    /// Erases the drawing and the current result. History stays.
    pub async fn clear(&self) {
        self.surface.lock().await.clear();
        let mut state = self.state.lock().await;
        state.clear();
        self.events
            .emit(SessionEvent::Cleared(SessionClearedEvent {
                history_cleared: false,
            }));
    }

    /// Clear, plus an empty history.
    pub async fn reset(&self) {
        self.surface.lock().await.clear();
        let mut state = self.state.lock().await;
        state.reset();
        self.events
            .emit(SessionEvent::Cleared(SessionClearedEvent {
                history_cleared: true,
            }));
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn canvas(&self) -> RasterImage {
        self.surface.lock().await.snapshot()
    }
}

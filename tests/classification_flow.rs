use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use digit_sketch_lib::{
    canvas::{PointerSample, RasterImage},
    classifier::{
        ClassLabel, ClassificationBoundary, ClassificationStrategy, ClassifyError,
        GeminiStrategy, HeuristicStrategy, Verdict,
    },
    config::ClassifierConfig,
    session::{SessionController, SessionEvent, SessionEvents, SessionStatus},
};

type Outcome = Result<Verdict, ClassifyError>;

/// Answers each call with the next scripted (delay, outcome) pair.
struct Scripted {
    steps: Mutex<VecDeque<(Duration, Outcome)>>,
}

impl Scripted {
    fn new(steps: Vec<(Duration, Outcome)>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }
}

impl ClassificationStrategy for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn classify(&self, _raster: &RasterImage) -> Result<Verdict, ClassifyError> {
        let (delay, outcome) = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted step left");
        tokio::time::sleep(delay).await;
        outcome
    }
}

#[derive(Default)]
struct RecordingEvents {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingEvents {
    fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }

    fn completed_ids(&self) -> Vec<u64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Completed(done) => Some(done.request_id),
                _ => None,
            })
            .collect()
    }
}

impl SessionEvents for RecordingEvents {
    fn emit(&self, event: SessionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn digit(value: u8, confidence: f64) -> Outcome {
    Ok(Verdict::new(ClassLabel::new(value).unwrap(), confidence))
}

fn remote_down() -> Outcome {
    Err(ClassifyError::RemoteService {
        status: Some(503),
        message: "unavailable".into(),
    })
}

fn controller<R, F>(
    remote: R,
    fallback: F,
) -> (SessionController<R, F>, Arc<RecordingEvents>)
where
    R: ClassificationStrategy,
    F: ClassificationStrategy,
{
    let events = Arc::new(RecordingEvents::default());
    let session = SessionController::new(
        ClassificationBoundary::new(remote, fallback),
        events.clone(),
        Duration::ZERO,
    );
    (session, events)
}

async fn draw_line<R, F>(session: &SessionController<R, F>)
where
    R: ClassificationStrategy,
    F: ClassificationStrategy,
{
    session
        .begin_stroke(PointerSample::logical(140.0, 40.0))
        .await
        .unwrap();
    session
        .extend_stroke(PointerSample::logical(140.0, 240.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn stroke_end_produces_result_and_history() {
    let remote = Scripted::new(vec![(Duration::ZERO, digit(8, 0.91))]);
    let (session, events) = controller(remote, HeuristicStrategy);

    draw_line(&session).await;
    let pending = session.end_stroke().await.unwrap();
    pending.handle.await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.status, SessionStatus::Ready);
    let prediction = snapshot.prediction.unwrap();
    assert_eq!(prediction.label.value(), 8);
    assert_eq!(prediction.confidence_percent, "91.0%");
    assert_eq!(prediction.bars.len(), 10);
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(
        events.names(),
        vec!["classification-started", "classification-completed"]
    );
}

#[tokio::test]
async fn end_without_stroke_does_nothing() {
    let (session, events) = controller(Scripted::new(vec![]), HeuristicStrategy);

    assert!(session.end_stroke().await.is_none());
    assert_eq!(session.snapshot().await.status, SessionStatus::Idle);
    assert!(events.names().is_empty());
}

#[tokio::test]
async fn slow_older_response_does_not_overwrite_newer_one() {
    let remote = Scripted::new(vec![
        (Duration::from_millis(200), digit(3, 0.9)),
        (Duration::ZERO, digit(5, 0.8)),
    ]);
    let (session, events) = controller(remote, HeuristicStrategy);

    draw_line(&session).await;
    let first = session.end_stroke().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    draw_line(&session).await;
    let second = session.end_stroke().await.unwrap();
    assert!(second.request_id > first.request_id);

    second.handle.await.unwrap();
    first.handle.await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.prediction.unwrap().label.value(), 5);
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].label.value(), 5);
    assert_eq!(events.completed_ids(), vec![second.request_id]);
}

#[tokio::test]
async fn clear_keeps_history_and_reset_empties_it() {
    let remote = Scripted::new(vec![(Duration::ZERO, digit(2, 0.7))]);
    let (session, events) = controller(remote, HeuristicStrategy);

    draw_line(&session).await;
    session.end_stroke().await.unwrap().handle.await.unwrap();

    session.clear().await;
    let cleared = session.snapshot().await;
    assert_eq!(cleared.status, SessionStatus::Idle);
    assert!(cleared.prediction.is_none());
    assert_eq!(cleared.history.len(), 1);

    // The canvas is blank again.
    let canvas = session.canvas().await;
    assert!(canvas.pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));

    session.reset().await;
    assert!(session.snapshot().await.history.is_empty());
    assert_eq!(events.names().last(), Some(&"session-cleared"));
}

#[tokio::test]
async fn clear_orphans_in_flight_request() {
    let remote = Scripted::new(vec![(Duration::from_millis(100), digit(6, 0.9))]);
    let (session, events) = controller(remote, HeuristicStrategy);

    draw_line(&session).await;
    let pending = session.end_stroke().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    session.clear().await;
    pending.handle.await.unwrap();

    let snapshot = session.snapshot().await;
    assert!(snapshot.prediction.is_none());
    assert!(snapshot.history.is_empty());
    assert!(events.completed_ids().is_empty());
}

#[tokio::test]
async fn low_confidence_result_is_shown_but_not_recorded() {
    let remote = Scripted::new(vec![(Duration::ZERO, digit(9, 0.05))]);
    let (session, _events) = controller(remote, HeuristicStrategy);

    draw_line(&session).await;
    session.end_stroke().await.unwrap().handle.await.unwrap();

    let snapshot = session.snapshot().await;
    let prediction = snapshot.prediction.unwrap();
    assert_eq!(prediction.label.value(), 9);
    assert!(prediction.low_confidence_warning);
    assert!(snapshot.history.is_empty());
}

#[tokio::test]
async fn remote_failure_uses_heuristic() {
    let remote = Scripted::new(vec![(Duration::ZERO, remote_down())]);
    let (session, _events) = controller(remote, HeuristicStrategy);

    // A horizontal bar near the top is top-heavy: the heuristic says 7.
    session
        .begin_stroke(PointerSample::logical(40.0, 40.0))
        .await
        .unwrap();
    session
        .extend_stroke(PointerSample::logical(240.0, 40.0))
        .await
        .unwrap();
    session.end_stroke().await.unwrap().handle.await.unwrap();

    let prediction = session.snapshot().await.prediction.unwrap();
    assert_eq!(prediction.label.value(), 7);
    assert_eq!(prediction.confidence, 0.6);
    assert!(prediction.reasoning.is_none());
}

#[tokio::test]
async fn fatal_fallback_failure_reports_error() {
    let remote = Scripted::new(vec![(Duration::ZERO, remote_down())]);
    let fallback = Scripted::new(vec![(
        Duration::ZERO,
        Err(ClassifyError::InvalidInput("unreadable".into())),
    )]);
    let (session, events) = controller(remote, fallback);

    draw_line(&session).await;
    session.end_stroke().await.unwrap().handle.await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.status, SessionStatus::Idle);
    assert!(snapshot.prediction.is_none());
    assert!(snapshot.history.is_empty());
    assert_eq!(
        events.names(),
        vec!["classification-started", "classification-failed"]
    );
}

#[tokio::test]
async fn unreachable_gemini_falls_back_to_heuristic() {
    let mut config = ClassifierConfig::new("test-key");
    config.endpoint = "http://127.0.0.1:9".into();
    let gemini = GeminiStrategy::new(Arc::new(config)).unwrap();
    let boundary = ClassificationBoundary::new(gemini, HeuristicStrategy);

    let raster = RasterImage::filled(280, 280, [255, 255, 255, 255]);
    let result = boundary.classify(&raster).await.unwrap();

    assert_eq!(result.label.value(), 0);
    assert_eq!(result.confidence, 0.4);
    assert_eq!(result.per_class_confidence.len(), 10);
}

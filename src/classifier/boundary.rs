use std::future::Future;

use crate::canvas::RasterImage;

use super::{ClassificationResult, ClassificationStrategy, ClassifyError, Verdict};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// The one place that decides which strategy answers a request.
///
/// The remote strategy goes first. Any failure there (transport, HTTP
/// status, unparsable reply) is logged and the same raster is handed to the
/// fallback. A fallback failure is returned to the caller.
pub struct ClassificationBoundary<R, F> {
    remote: R,
    fallback: F,
}

impl<R, F> ClassificationBoundary<R, F>
where
    R: ClassificationStrategy,
    F: ClassificationStrategy,
{
    pub fn new(remote: R, fallback: F) -> Self {
        Self { remote, fallback }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub fn classify<'a>(
        &'a self,
        raster: &'a RasterImage,
    ) -> impl Future<Output = Result<ClassificationResult, ClassifyError>> + Send + 'a {
        async move {
            let verdict = self.verdict(raster).await?;
            Ok(into_result(verdict))
        }
    }

    async fn verdict(&self, raster: &RasterImage) -> Result<Verdict, ClassifyError> {
        match self.remote.classify(raster).await {
            Ok(verdict) => {
                log_info!(
                    "{} classified digit {} ({:.2})",
                    self.remote.name(),
                    verdict.label,
                    verdict.confidence
                );
                Ok(verdict)
            }
            Err(err) => {
                log_warn!(
                    "{} failed, falling back to {}: {}",
                    self.remote.name(),
                    self.fallback.name(),
                    err
                );
                let verdict = self.fallback.classify(raster).await.map_err(|err| {
                    log_error!("{} failed as well: {}", self.fallback.name(), err);
                    err
                })?;
                log_info!(
                    "{} classified digit {} ({:.2})",
                    self.fallback.name(),
                    verdict.label,
                    verdict.confidence
                );
                Ok(verdict)
            }
        }
    }
}

fn into_result(verdict: Verdict) -> ClassificationResult {
    ClassificationResult::from_verdict(verdict, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassLabel, HeuristicStrategy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        outcome: fn() -> Result<Verdict, ClassifyError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(outcome: fn() -> Result<Verdict, ClassifyError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ClassificationStrategy for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn classify(&self, _raster: &RasterImage) -> Result<Verdict, ClassifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn blank() -> RasterImage {
        RasterImage::filled(280, 280, [255; 4])
    }

    fn remote_four() -> Result<Verdict, ClassifyError> {
        Ok(Verdict::new(ClassLabel::new(4).unwrap(), 0.93).with_reasoning("closed top"))
    }

    fn remote_down() -> Result<Verdict, ClassifyError> {
        Err(ClassifyError::RemoteService {
            status: Some(500),
            message: "boom".into(),
        })
    }

    fn remote_garbled() -> Result<Verdict, ClassifyError> {
        Err(ClassifyError::MalformedResponse("no JSON object in reply".into()))
    }

    fn fallback_broken() -> Result<Verdict, ClassifyError> {
        Err(ClassifyError::InvalidInput("unreadable surface".into()))
    }

    #[tokio::test]
    async fn remote_success_skips_fallback() {
        let boundary =
            ClassificationBoundary::new(Scripted::new(remote_four), Scripted::new(remote_four));
        let result = boundary.classify(&blank()).await.unwrap();

        assert_eq!(result.label.value(), 4);
        assert_eq!(result.confidence, 0.93);
        assert_eq!(result.reasoning.as_deref(), Some("closed top"));
        assert_eq!(boundary.fallback().calls(), 0);
    }

    #[tokio::test]
    async fn remote_failures_fall_back_to_heuristic() {
        for outcome in [remote_down as fn() -> _, remote_garbled] {
            let boundary = ClassificationBoundary::new(Scripted::new(outcome), HeuristicStrategy);
            let result = boundary.classify(&blank()).await.unwrap();

            // Blank canvas is balanced: heuristic answers 0 @ 0.4.
            assert_eq!(result.label.value(), 0);
            assert_eq!(result.confidence, 0.4);
            assert!(result.reasoning.is_none());
            assert_eq!(result.per_class_confidence.len(), 10);
            assert_eq!(result.confidence_for(result.label), Some(0.4));
        }
    }

    #[tokio::test]
    async fn fallback_failure_is_fatal() {
        let boundary =
            ClassificationBoundary::new(Scripted::new(remote_down), Scripted::new(fallback_broken));
        let err = boundary.classify(&blank()).await.unwrap_err();

        assert!(matches!(err, ClassifyError::InvalidInput(_)));
        assert_eq!(boundary.remote().calls(), 1);
        assert_eq!(boundary.fallback().calls(), 1);
    }
}

use std::future::Future;

use crate::canvas::RasterImage;

use super::{ClassifyError, Verdict};

/// One way of turning a captured raster into a digit verdict. Strategies are
/// interchangeable; `ClassificationBoundary` decides which one answers.
pub trait ClassificationStrategy: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn classify(
        &self,
        raster: &RasterImage,
    ) -> impl Future<Output = Result<Verdict, ClassifyError>> + Send;
}

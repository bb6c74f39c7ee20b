pub mod raster;
pub mod surface;

pub use raster::RasterImage;
pub use surface::{CanvasError, DrawingSurface, LogicalPoint, PointerSample, CANVAS_SIZE, STROKE_WIDTH};

//! Common geospatial primitives shared across the raster analytics workspace.

pub mod envelope;
pub mod error;
pub mod geotransform;

pub use envelope::Envelope;
pub use error::{CommonError, CommonResult};
pub use geotransform::GeoTransform;

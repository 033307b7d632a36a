//! Conversion engine
//!
//! Decodes raster images or rasterizes SVG documents, resizes, and encodes
//! the requested target format, optionally searching for a quality that fits
//! a byte budget.

pub mod converter;
pub mod encode;
pub mod optimizer;
pub mod output_path;
pub mod resize;
pub mod vector;

pub use converter::Converter;
pub use encode::TargetEncoder;
pub use optimizer::{optimize_quality, OptimizedEncoding};
pub use output_path::resolve_output_path;
pub use resize::compute_dimensions;

use crate::models::{ConversionOptions, ConversionResult, ImageInfo};
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Runs one conversion job. Failures are reported in the result.
    async fn convert(&self, source: &Path, options: &ConversionOptions) -> ConversionResult;

    async fn image_info(&self, path: &Path) -> Result<ImageInfo>;

    fn is_supported_format(&self, path: &Path) -> bool {
        crate::format::is_supported_format(path)
    }
}

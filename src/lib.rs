//! Image conversion engine - converts still images between raster formats
//! and rasterizes SVG documents
//!
//! A conversion job decodes the source, optionally resizes it, picks an output
//! path that does not clobber existing files, and encodes the target format,
//! searching for an encoder quality that fits a byte budget when one is set.

pub mod engine;
pub mod error;
pub mod format;
pub mod models;

pub use engine::{ConversionService, Converter};
pub use error::{Error, Result};
pub use format::{is_supported_format, ImageFormatKind};
pub use models::{ConversionOptions, ConversionResult, ImageInfo, ResizeMode, ResizeOptions};

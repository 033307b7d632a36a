//! Error handling and custom error types
//!
//! Provides unified error handling across the conversion engine using thiserror.

use crate::format::ImageFormatKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("{0} cannot be used as a conversion target")]
    UnsupportedTargetFormat(ImageFormatKind),

    #[error("Vector document error: {0}")]
    VectorParse(String),

    #[error("Image decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Image encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;

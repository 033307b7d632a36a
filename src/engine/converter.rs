use super::encode::TargetEncoder;
use super::optimizer::optimize_quality;
use super::output_path::resolve_output_path;
use super::resize::compute_dimensions;
use super::vector;
use super::ConversionService;
use crate::format::{sniff_format, ImageFormatKind};
use crate::models::{ConversionJob, ConversionOptions, ConversionResult, ImageInfo};
use crate::{Error, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::fs::Metadata;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// How the source is turned into pixels; chosen once per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceDecoder {
    Raster,
    Vector,
}

/// Extension first; content sniffing only when the extension is unknown.
fn source_kind(source: &Path, data: &[u8]) -> Option<ImageFormatKind> {
    ImageFormatKind::from_path(source).or_else(|| sniff_format(data))
}

/// Metadata of a regular file; missing paths and non-files are `SourceNotFound`.
async fn source_metadata(source: &Path) -> Result<Metadata> {
    match fs::metadata(source).await {
        Ok(meta) if meta.is_file() => Ok(meta),
        Ok(_) => Err(Error::SourceNotFound(source.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(Error::SourceNotFound(source.to_path_buf()))
        }
        Err(e) => Err(Error::Io(e)),
    }
}

impl SourceDecoder {
    fn select(source: &Path, data: &[u8]) -> Self {
        match source_kind(source, data) {
            Some(kind) if kind.is_vector() => SourceDecoder::Vector,
            _ => SourceDecoder::Raster,
        }
    }
}

struct Decoded {
    image: DynamicImage,
    original_width: u32,
    original_height: u32,
}

struct Encoded {
    bytes: Vec<u8>,
    quality: Option<u8>,
}

/// Runs conversion jobs: decode, resize, pick an output path, encode, write.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter;

impl Converter {
    pub fn new() -> Self {
        Self
    }

    /// Converts every job concurrently. Results keep the input order.
    pub async fn convert_batch(&self, jobs: Vec<ConversionJob>) -> Vec<ConversionResult> {
        let mut results: Vec<Option<ConversionResult>> = vec![None; jobs.len()];
        let mut tasks = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let converter = *self;
            tasks.spawn(async move {
                let result = converter.convert(&job.source, &job.options).await;
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!("Conversion task join error: {}", e),
            }
        }

        results
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|| {
                    ConversionResult::failed("Conversion task aborted", Duration::ZERO)
                })
            })
            .collect()
    }

    fn decode_sync(
        decoder: SourceDecoder,
        data: Vec<u8>,
        resources_dir: Option<PathBuf>,
        options: ConversionOptions,
    ) -> Result<Decoded> {
        match decoder {
            SourceDecoder::Vector => {
                let transparent = options.target_format.capabilities().supports_transparency;
                let rasterized = vector::rasterize(
                    &data,
                    resources_dir.as_deref(),
                    &options.resize,
                    transparent,
                )?;
                Ok(Decoded {
                    image: DynamicImage::ImageRgba8(rasterized.image),
                    original_width: rasterized.intrinsic_width,
                    original_height: rasterized.intrinsic_height,
                })
            }
            SourceDecoder::Raster => {
                let image = ImageReader::new(Cursor::new(data))
                    .with_guessed_format()?
                    .decode()
                    .map_err(Error::Decode)?;
                let (original_width, original_height) = image.dimensions();
                let (width, height) =
                    compute_dimensions(original_width, original_height, &options.resize);

                let image = if (width, height) != (original_width, original_height) {
                    debug!(
                        "Resizing {}x{} -> {}x{}",
                        original_width, original_height, width, height
                    );
                    image.resize_exact(width, height, FilterType::Lanczos3)
                } else {
                    image
                };

                Ok(Decoded {
                    image,
                    original_width,
                    original_height,
                })
            }
        }
    }

    fn encode_sync(image: DynamicImage, options: ConversionOptions) -> Result<Encoded> {
        let target = options.target_format;
        let encoder = TargetEncoder::new(image, target)?;
        let quality = options.effective_quality();

        if let Some(budget) = options.byte_budget() {
            let optimized = optimize_quality(quality, budget, |q| encoder.encode(q))?;
            info!(
                "Quality search settled on {} after {} probes ({} bytes, budget {})",
                optimized.quality,
                optimized.probes,
                optimized.bytes.len(),
                budget
            );
            return Ok(Encoded {
                bytes: optimized.bytes,
                quality: Some(optimized.quality),
            });
        }

        Ok(Encoded {
            bytes: encoder.encode(quality)?,
            quality: target.capabilities().supports_quality.then_some(quality),
        })
    }

    async fn run_blocking<T, F>(what: &str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| Error::Invariant(format!("{} task join error: {}", what, e)))?
    }

    async fn run(
        &self,
        source: &Path,
        options: &ConversionOptions,
        started: Instant,
    ) -> Result<ConversionResult> {
        let source_meta = source_metadata(source).await?;

        let target = options.target_format;
        if !target.capabilities().can_be_target {
            return Err(Error::UnsupportedTargetFormat(target));
        }

        let data = fs::read(source).await?;
        let decoder = SourceDecoder::select(source, &data);
        debug!("Decoding {} as {:?} source", source.display(), decoder);

        let decoded = Self::run_blocking("Decode", {
            let resources_dir = source.parent().map(Path::to_path_buf);
            let options = options.clone();
            move || Self::decode_sync(decoder, data, resources_dir, options)
        })
        .await?;
        let (new_width, new_height) = decoded.image.dimensions();

        let output_path = Self::run_blocking("Output path", {
            let source = source.to_path_buf();
            let options = options.clone();
            move || Ok(resolve_output_path(&source, &options))
        })
        .await?;

        if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let encoded = Self::run_blocking("Encode", {
            let options = options.clone();
            move || Self::encode_sync(decoded.image, options)
        })
        .await?;

        fs::write(&output_path, &encoded.bytes).await?;
        let new_size_bytes = fs::metadata(&output_path).await?.len();

        Ok(ConversionResult {
            success: true,
            output_path: Some(output_path),
            original_size_bytes: source_meta.len(),
            new_size_bytes,
            original_width: decoded.original_width,
            original_height: decoded.original_height,
            new_width,
            new_height,
            final_quality: encoded.quality,
            elapsed: started.elapsed(),
            error_message: None,
        })
    }
}

#[async_trait]
impl ConversionService for Converter {
    async fn convert(&self, source: &Path, options: &ConversionOptions) -> ConversionResult {
        let started = Instant::now();
        info!("Converting {} to {}", source.display(), options.target_format);

        match self.run(source, options, started).await {
            Ok(result) => {
                info!(
                    "Converted {} -> {} ({}x{} -> {}x{}, {} -> {} bytes) in {:?}",
                    source.display(),
                    result
                        .output_path
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    result.original_width,
                    result.original_height,
                    result.new_width,
                    result.new_height,
                    result.original_size_bytes,
                    result.new_size_bytes,
                    result.elapsed
                );
                result
            }
            Err(e) => {
                warn!("Conversion of {} failed: {}", source.display(), e);
                ConversionResult::failed(e.to_string(), started.elapsed())
            }
        }
    }

    async fn image_info(&self, path: &Path) -> Result<ImageInfo> {
        let meta = source_metadata(path).await?;
        let data = fs::read(path).await?;
        let detected = source_kind(path, &data);

        let (width, height) = Self::run_blocking("Probe", {
            let resources_dir = path.parent().map(Path::to_path_buf);
            move || match detected {
                Some(ImageFormatKind::Svg) => {
                    vector::document_size(&data, resources_dir.as_deref())
                }
                _ => ImageReader::new(Cursor::new(data))
                    .with_guessed_format()?
                    .into_dimensions()
                    .map_err(Error::Decode),
            }
        })
        .await?;

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or_default();

        Ok(ImageInfo {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            format: detected
                .map(|kind| kind.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            has_transparency: detected
                .map(|kind| kind.capabilities().supports_transparency)
                .unwrap_or(false),
            extension,
            size_bytes: meta.len(),
            width,
            height,
        })
    }
}

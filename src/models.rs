//! Data models and structures
//!
//! Defines the per-request conversion options, the read-only image snapshot,
//! the conversion outcome, and environment-driven configuration.

use crate::format::ImageFormatKind;
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    #[default]
    None,
    ExactSize,
    MaxWidth,
    MaxHeight,
    Percentage,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(ResizeMode::None),
            "exact" | "exact_size" => Ok(ResizeMode::ExactSize),
            "max_width" => Ok(ResizeMode::MaxWidth),
            "max_height" => Ok(ResizeMode::MaxHeight),
            "percent" | "percentage" => Ok(ResizeMode::Percentage),
            other => Err(format!("Unknown resize mode '{}'", other)),
        }
    }
}

/// Resize policy and its parameters.
///
/// In `Percentage` mode the percentage is carried in `target_width`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOptions {
    pub mode: ResizeMode,
    pub target_width: u32,
    pub target_height: u32,
    pub maintain_aspect_ratio: bool,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            mode: ResizeMode::None,
            target_width: 0,
            target_height: 0,
            maintain_aspect_ratio: true,
        }
    }
}

impl ResizeOptions {
    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            mode: ResizeMode::ExactSize,
            target_width: width,
            target_height: height,
            maintain_aspect_ratio: false,
        }
    }

    pub fn max_width(width: u32, maintain_aspect_ratio: bool) -> Self {
        Self {
            mode: ResizeMode::MaxWidth,
            target_width: width,
            maintain_aspect_ratio,
            ..Self::default()
        }
    }

    pub fn max_height(height: u32, maintain_aspect_ratio: bool) -> Self {
        Self {
            mode: ResizeMode::MaxHeight,
            target_height: height,
            maintain_aspect_ratio,
            ..Self::default()
        }
    }

    pub fn percentage(percent: u32) -> Self {
        Self {
            mode: ResizeMode::Percentage,
            target_width: percent,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub target_format: ImageFormatKind,
    /// Encoder quality, 1..=100. Ignored by formats without a quality knob.
    pub quality: u8,
    pub resize: ResizeOptions,
    /// Output byte budget in kilobytes; 0 disables the quality search.
    pub target_size_kb: u32,
    pub output_path: Option<PathBuf>,
    pub overwrite_existing: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_format: ImageFormatKind::Png,
            quality: DEFAULT_QUALITY,
            resize: ResizeOptions::default(),
            target_size_kb: 0,
            output_path: None,
            overwrite_existing: false,
        }
    }
}

impl ConversionOptions {
    pub fn new(target_format: ImageFormatKind) -> Self {
        Self {
            target_format,
            ..Self::default()
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_resize(mut self, resize: ResizeOptions) -> Self {
        self.resize = resize;
        self
    }

    pub fn with_target_size_kb(mut self, target_size_kb: u32) -> Self {
        self.target_size_kb = target_size_kb;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite_existing: bool) -> Self {
        self.overwrite_existing = overwrite_existing;
        self
    }

    /// Requested quality clamped into the encoder range.
    pub fn effective_quality(&self) -> u8 {
        self.quality.clamp(1, 100)
    }

    /// Byte budget, if the quality search applies to this target.
    pub fn byte_budget(&self) -> Option<u64> {
        if self.target_size_kb > 0 && self.target_format.capabilities().supports_quality {
            Some(u64::from(self.target_size_kb) * 1024)
        } else {
            None
        }
    }
}

/// Read-only snapshot of a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub name: String,
    pub extension: String,
    pub directory: PathBuf,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub has_transparency: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub original_size_bytes: u64,
    pub new_size_bytes: u64,
    pub original_width: u32,
    pub original_height: u32,
    pub new_width: u32,
    pub new_height: u32,
    /// Quality handed to the encoder, for targets that take one.
    pub final_quality: Option<u8>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub error_message: Option<String>,
}

impl ConversionResult {
    pub fn failed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            output_path: None,
            original_size_bytes: 0,
            new_size_bytes: 0,
            original_width: 0,
            original_height: 0,
            new_width: 0,
            new_height: 0,
            final_quality: None,
            elapsed,
            error_message: Some(message.into()),
        }
    }

    /// Output size as a fraction of the input size.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.success && self.original_size_bytes > 0 {
            Some(self.new_size_bytes as f64 / self.original_size_bytes as f64)
        } else {
            None
        }
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// One entry of a batch run.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub options: ConversionOptions,
}

impl ConversionJob {
    pub fn new(source: impl Into<PathBuf>, options: ConversionOptions) -> Self {
        Self {
            source: source.into(),
            options,
        }
    }
}

// Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_quality: u8,
    pub overwrite_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            overwrite_existing: false,
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(
            std::env::var("IMAGE_CONVERTER_QUALITY").ok(),
            std::env::var("IMAGE_CONVERTER_OVERWRITE").ok(),
        )
    }

    fn from_vars(quality: Option<String>, overwrite: Option<String>) -> crate::Result<Self> {
        let default_quality = match quality {
            Some(raw) => match raw.trim().parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => q,
                _ => {
                    return Err(crate::Error::Config(format!(
                        "IMAGE_CONVERTER_QUALITY must be 1-100, got '{}'",
                        raw
                    )))
                }
            },
            None => DEFAULT_QUALITY,
        };

        let overwrite_existing = match overwrite.as_deref().map(str::trim) {
            None => false,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") | Some("") => false,
            Some(other) => {
                return Err(crate::Error::Config(format!(
                    "IMAGE_CONVERTER_OVERWRITE must be a boolean, got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            default_quality,
            overwrite_existing,
        })
    }

    /// Options for `target` seeded with the configured defaults.
    pub fn options_for(&self, target: ImageFormatKind) -> ConversionOptions {
        ConversionOptions::new(target)
            .with_quality(self.default_quality)
            .with_overwrite(self.overwrite_existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_serialization() {
        let options = ConversionOptions::new(ImageFormatKind::Jpeg)
            .with_resize(ResizeOptions::max_width(640, true));

        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"target_format\":\"jpeg\""));
        assert!(json.contains("\"mode\":\"max_width\""));

        let deserialized: ConversionOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, options);
    }

    #[test]
    fn test_byte_budget_requires_quality_support() {
        let jpeg = ConversionOptions::new(ImageFormatKind::Jpeg).with_target_size_kb(50);
        assert_eq!(jpeg.byte_budget(), Some(50 * 1024));

        let png = ConversionOptions::new(ImageFormatKind::Png).with_target_size_kb(50);
        assert_eq!(png.byte_budget(), None);

        let disabled = ConversionOptions::new(ImageFormatKind::Jpeg);
        assert_eq!(disabled.byte_budget(), None);
    }

    #[test]
    fn test_effective_quality_is_clamped() {
        assert_eq!(ConversionOptions::default().with_quality(0).effective_quality(), 1);
        assert_eq!(ConversionOptions::default().with_quality(150).effective_quality(), 100);
        assert_eq!(ConversionOptions::default().with_quality(70).effective_quality(), 70);
    }

    #[test]
    fn test_resize_mode_from_str() {
        assert_eq!("max-width".parse::<ResizeMode>(), Ok(ResizeMode::MaxWidth));
        assert_eq!("Percentage".parse::<ResizeMode>(), Ok(ResizeMode::Percentage));
        assert!("stretch".parse::<ResizeMode>().is_err());
    }

    #[test]
    fn test_failed_result_serializes_elapsed_millis() {
        let result = ConversionResult::failed("boom", Duration::from_millis(1500));
        assert!(!result.success);
        assert_eq!(result.compression_ratio(), None);

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"elapsed_ms\":1500"));
        assert!(json.contains("\"error_message\":\"boom\""));
    }

    #[test]
    fn test_config_from_vars() {
        assert_eq!(Config::from_vars(None, None).unwrap(), Config::default());

        let config = Config::from_vars(Some("60".to_string()), Some("true".to_string())).unwrap();
        assert_eq!(config.default_quality, 60);
        assert!(config.overwrite_existing);

        let options = config.options_for(ImageFormatKind::WebP);
        assert_eq!(options.quality, 60);
        assert!(options.overwrite_existing);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(Config::from_vars(Some("0".to_string()), None).is_err());
        assert!(Config::from_vars(Some("abc".to_string()), None).is_err());
        assert!(Config::from_vars(None, Some("maybe".to_string())).is_err());
    }
}

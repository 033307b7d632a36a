//! Format capability catalog
//!
//! Static per-format traits used to decide encoder applicability and the
//! background-fill policy for each target.

pub mod sniff;

pub use sniff::sniff_format;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Extensions accepted as conversion sources, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "ico", "svg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatKind {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
    Ico,
    Svg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCapabilities {
    pub name: &'static str,
    /// Canonical extension written for outputs, without the dot.
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub supports_quality: bool,
    pub supports_transparency: bool,
    pub can_be_target: bool,
}

const JPEG: FormatCapabilities = FormatCapabilities {
    name: "JPEG",
    extension: "jpg",
    mime_type: "image/jpeg",
    supports_quality: true,
    supports_transparency: false,
    can_be_target: true,
};

const PNG: FormatCapabilities = FormatCapabilities {
    name: "PNG",
    extension: "png",
    mime_type: "image/png",
    supports_quality: false,
    supports_transparency: true,
    can_be_target: true,
};

// The bundled WebP encoder is lossless only, so there is no quality knob.
const WEBP: FormatCapabilities = FormatCapabilities {
    name: "WebP",
    extension: "webp",
    mime_type: "image/webp",
    supports_quality: false,
    supports_transparency: true,
    can_be_target: true,
};

const GIF: FormatCapabilities = FormatCapabilities {
    name: "GIF",
    extension: "gif",
    mime_type: "image/gif",
    supports_quality: false,
    supports_transparency: true,
    can_be_target: true,
};

const BMP: FormatCapabilities = FormatCapabilities {
    name: "BMP",
    extension: "bmp",
    mime_type: "image/bmp",
    supports_quality: false,
    supports_transparency: false,
    can_be_target: true,
};

const TIFF: FormatCapabilities = FormatCapabilities {
    name: "TIFF",
    extension: "tiff",
    mime_type: "image/tiff",
    supports_quality: false,
    supports_transparency: true,
    can_be_target: true,
};

const ICO: FormatCapabilities = FormatCapabilities {
    name: "ICO",
    extension: "ico",
    mime_type: "image/x-icon",
    supports_quality: false,
    supports_transparency: true,
    can_be_target: true,
};

const SVG: FormatCapabilities = FormatCapabilities {
    name: "SVG",
    extension: "svg",
    mime_type: "image/svg+xml",
    supports_quality: false,
    supports_transparency: true,
    can_be_target: false,
};

impl ImageFormatKind {
    pub const ALL: [ImageFormatKind; 8] = [
        ImageFormatKind::Jpeg,
        ImageFormatKind::Png,
        ImageFormatKind::WebP,
        ImageFormatKind::Gif,
        ImageFormatKind::Bmp,
        ImageFormatKind::Tiff,
        ImageFormatKind::Ico,
        ImageFormatKind::Svg,
    ];

    pub fn capabilities(self) -> &'static FormatCapabilities {
        match self {
            ImageFormatKind::Jpeg => &JPEG,
            ImageFormatKind::Png => &PNG,
            ImageFormatKind::WebP => &WEBP,
            ImageFormatKind::Gif => &GIF,
            ImageFormatKind::Bmp => &BMP,
            ImageFormatKind::Tiff => &TIFF,
            ImageFormatKind::Ico => &ICO,
            ImageFormatKind::Svg => &SVG,
        }
    }

    /// Looks up a format by file extension, with or without a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormatKind::Jpeg),
            "png" => Some(ImageFormatKind::Png),
            "webp" => Some(ImageFormatKind::WebP),
            "gif" => Some(ImageFormatKind::Gif),
            "bmp" => Some(ImageFormatKind::Bmp),
            "tiff" | "tif" => Some(ImageFormatKind::Tiff),
            "ico" => Some(ImageFormatKind::Ico),
            "svg" => Some(ImageFormatKind::Svg),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn is_vector(self) -> bool {
        matches!(self, ImageFormatKind::Svg)
    }

    /// Dot-prefixed extension used when deriving output file names.
    pub fn dotted_extension(self) -> String {
        format!(".{}", self.capabilities().extension)
    }
}

impl fmt::Display for ImageFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.capabilities().name)
    }
}

impl FromStr for ImageFormatKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("Unknown image format '{}'", s))
    }
}

pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_svg_is_not_a_target() {
        for kind in ImageFormatKind::ALL {
            assert_eq!(kind.capabilities().can_be_target, kind != ImageFormatKind::Svg);
        }
    }

    #[test]
    fn test_quality_and_transparency_flags() {
        assert!(ImageFormatKind::Jpeg.capabilities().supports_quality);
        assert!(!ImageFormatKind::Jpeg.capabilities().supports_transparency);
        assert!(!ImageFormatKind::Png.capabilities().supports_quality);
        assert!(ImageFormatKind::Png.capabilities().supports_transparency);
        assert!(!ImageFormatKind::Bmp.capabilities().supports_transparency);
        assert!(ImageFormatKind::Svg.capabilities().supports_transparency);
    }

    #[test]
    fn test_from_extension_aliases() {
        assert_eq!(ImageFormatKind::from_extension("jpeg"), Some(ImageFormatKind::Jpeg));
        assert_eq!(ImageFormatKind::from_extension(".JPG"), Some(ImageFormatKind::Jpeg));
        assert_eq!(ImageFormatKind::from_extension("tif"), Some(ImageFormatKind::Tiff));
        assert_eq!(ImageFormatKind::from_extension("heic"), None);
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!("webp".parse::<ImageFormatKind>(), Ok(ImageFormatKind::WebP));
        assert!("psd".parse::<ImageFormatKind>().is_err());
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(ImageFormatKind::Jpeg.dotted_extension(), ".jpg");
        assert_eq!(ImageFormatKind::Tiff.dotted_extension(), ".tiff");
    }

    #[test]
    fn test_is_supported_format() {
        assert!(is_supported_format(Path::new("/tmp/photo.JPEG")));
        assert!(is_supported_format(Path::new("logo.svg")));
        assert!(is_supported_format(Path::new("scan.tif")));
        assert!(!is_supported_format(Path::new("notes.txt")));
        assert!(!is_supported_format(Path::new("no_extension")));
    }
}

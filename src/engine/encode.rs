use crate::format::ImageFormatKind;
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;

/// Pixels prepared once for a target format, encodable at any quality.
pub struct TargetEncoder {
    format: ImageFormatKind,
    image: DynamicImage,
}

impl TargetEncoder {
    pub fn new(image: DynamicImage, format: ImageFormatKind) -> Result<Self> {
        let caps = format.capabilities();
        if !caps.can_be_target {
            return Err(Error::UnsupportedTargetFormat(format));
        }

        Ok(Self {
            format,
            image: prepare(image, caps.supports_transparency),
        })
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// Encodes the whole file into memory. `quality` only affects JPEG.
    pub fn encode(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self.format {
            ImageFormatKind::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
                self.image.write_with_encoder(encoder).map_err(Error::Encode)?;
            }
            // No ICO container writer; icons are written as PNG data.
            ImageFormatKind::Png | ImageFormatKind::Ico => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buf,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                self.image.write_with_encoder(encoder).map_err(Error::Encode)?;
            }
            ImageFormatKind::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut buf);
                self.image.write_with_encoder(encoder).map_err(Error::Encode)?;
            }
            ImageFormatKind::Gif => self.write_container(&mut buf, ImageFormat::Gif)?,
            ImageFormatKind::Bmp => self.write_container(&mut buf, ImageFormat::Bmp)?,
            ImageFormatKind::Tiff => self.write_container(&mut buf, ImageFormat::Tiff)?,
            ImageFormatKind::Svg => return Err(Error::UnsupportedTargetFormat(self.format)),
        }
        Ok(buf)
    }

    fn write_container(&self, buf: &mut Vec<u8>, format: ImageFormat) -> Result<()> {
        self.image
            .write_to(&mut Cursor::new(buf), format)
            .map_err(Error::Encode)
    }
}

/// Normalizes to 8-bit RGB(A); alpha is composited onto white when the target
/// cannot store it.
fn prepare(image: DynamicImage, keep_alpha: bool) -> DynamicImage {
    if !image.color().has_alpha() {
        return match image {
            DynamicImage::ImageRgb8(_) => image,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
    }

    if keep_alpha {
        match image {
            DynamicImage::ImageRgba8(_) => image,
            other => DynamicImage::ImageRgba8(other.into_rgba8()),
        }
    } else {
        DynamicImage::ImageRgb8(flatten_onto_white(&image.into_rgba8()))
    }
}

fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let a = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

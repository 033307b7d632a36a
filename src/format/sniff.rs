use super::ImageFormatKind;

/// Detects the container format from leading bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormatKind> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormatKind::Jpeg),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormatKind::Png),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => {
            Some(ImageFormatKind::WebP)
        }
        [0x47, 0x49, 0x46, 0x38, ..] => Some(ImageFormatKind::Gif),
        [0x42, 0x4D, ..] => Some(ImageFormatKind::Bmp),
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some(ImageFormatKind::Tiff),
        [0x00, 0x00, 0x01, 0x00, ..] => Some(ImageFormatKind::Ico),
        _ if looks_like_svg(bytes) => Some(ImageFormatKind::Svg),
        _ => {
            tracing::debug!(
                "Unrecognized image signature (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

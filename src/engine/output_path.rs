use crate::models::ConversionOptions;
use std::path::{Path, PathBuf};

/// Highest `" (n)"` suffix tried before giving up on finding a free name.
pub const MAX_COLLISION_ATTEMPTS: u32 = 1000;

/// Resolves where a conversion of `source` should be written.
pub fn resolve_output_path(source: &Path, options: &ConversionOptions) -> PathBuf {
    resolve_output_path_with(source, options, |path| path.exists())
}

/// Like [`resolve_output_path`], with the existence check supplied by the caller.
///
/// An explicit `options.output_path` is returned as-is. Otherwise the output
/// sits next to the source with the target extension, and `" (n)"` is appended
/// to the stem until `exists` reports a free name. After
/// [`MAX_COLLISION_ATTEMPTS`] the last candidate is returned even if taken.
pub fn resolve_output_path_with<F>(
    source: &Path,
    options: &ConversionOptions,
    exists: F,
) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    if let Some(path) = &options.output_path {
        return path.clone();
    }

    let directory = source.parent().unwrap_or_else(|| Path::new(""));
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let extension = options.target_format.dotted_extension();

    let candidate = directory.join(format!("{}{}", stem, extension));
    if options.overwrite_existing || !exists(&candidate) {
        return candidate;
    }

    let mut attempt = candidate;
    for n in 1..=MAX_COLLISION_ATTEMPTS {
        attempt = directory.join(format!("{} ({}){}", stem, n, extension));
        if !exists(&attempt) {
            return attempt;
        }
    }

    tracing::warn!(
        "No free output name after {} attempts, reusing {}",
        MAX_COLLISION_ATTEMPTS,
        attempt.display()
    );
    attempt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ImageFormatKind;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn options(target: ImageFormatKind) -> ConversionOptions {
        ConversionOptions::new(target)
    }

    #[test]
    fn test_derives_sibling_path_with_target_extension() {
        let path = resolve_output_path_with(
            Path::new("/photos/holiday.heic.png"),
            &options(ImageFormatKind::Jpeg),
            |_| false,
        );
        assert_eq!(path, PathBuf::from("/photos/holiday.heic.jpg"));
    }

    #[test]
    fn test_explicit_output_path_is_unchanged() {
        let opts = options(ImageFormatKind::Png).with_output_path("/out/custom.bin");
        let path = resolve_output_path_with(Path::new("/in/a.jpg"), &opts, |_| true);
        assert_eq!(path, PathBuf::from("/out/custom.bin"));
    }

    #[test]
    fn test_collision_appends_counter() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("photo.png"), b"taken").unwrap();

        let source = dir.path().join("photo.jpg");
        let path = resolve_output_path(&source, &options(ImageFormatKind::Png));
        assert_eq!(path, dir.path().join("photo (1).png"));
    }

    #[test]
    fn test_overwrite_skips_collision_check() {
        let opts = options(ImageFormatKind::Png).with_overwrite(true);
        let path = resolve_output_path_with(Path::new("/x/photo.jpg"), &opts, |_| true);
        assert_eq!(path, PathBuf::from("/x/photo.png"));
    }

    #[test]
    fn test_skips_every_taken_name() {
        let taken: HashSet<PathBuf> = ["a.gif", "a (1).gif", "a (2).gif", "a (4).gif"]
            .iter()
            .map(|name| Path::new("/d").join(name))
            .collect();
        let path = resolve_output_path_with(
            Path::new("/d/a.bmp"),
            &options(ImageFormatKind::Gif),
            |p| taken.contains(p),
        );
        assert_eq!(path, PathBuf::from("/d/a (3).gif"));
        assert!(!taken.contains(&path));
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let path = resolve_output_path_with(
            Path::new("/d/a.bmp"),
            &options(ImageFormatKind::Gif),
            |_| true,
        );
        assert_eq!(path, PathBuf::from("/d/a (1000).gif"));
    }
}

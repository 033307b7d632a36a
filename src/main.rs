use anyhow::Result;
use clap::Parser;
use image_converter::models::{Config, ResizeOptions};
use image_converter::{ConversionService, Converter, ImageFormatKind, ResizeMode};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-converter")]
#[command(about = "Convert images between formats, with optional resizing and size targets")]
struct CliArgs {
    /// Source image or SVG document.
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Target format (jpg, png, webp, gif, bmp, tiff, ico).
    #[arg(long = "to", value_name = "FORMAT", required_unless_present = "info")]
    target: Option<ImageFormatKind>,

    /// Encoder quality 1-100, defaults to IMAGE_CONVERTER_QUALITY or 85.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// none, exact, max-width, max-height or percentage.
    #[arg(long, default_value = "none")]
    resize_mode: ResizeMode,

    /// Target width in pixels, or the percentage in percentage mode.
    #[arg(long, default_value_t = 0)]
    width: u32,

    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Do not scale the other axis in max-width/max-height modes.
    #[arg(long)]
    ignore_aspect: bool,

    /// Search for the best quality that fits this many kilobytes.
    #[arg(long, default_value_t = 0)]
    target_kb: u32,

    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long)]
    overwrite: bool,

    /// Print image information instead of converting.
    #[arg(long)]
    info: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_converter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;
    let converter = Converter::new();

    if !converter.is_supported_format(&args.source) {
        error!("Unsupported source format: {}", args.source.display());
        std::process::exit(1);
    }

    if args.info {
        match converter.image_info(&args.source).await {
            Ok(info) => {
                println!("{}", serde_json::to_string_pretty(&info)?);
                return Ok(());
            }
            Err(e) => {
                error!("Failed to read image info: {}", e);
                std::process::exit(1);
            }
        }
    }

    let Some(target) = args.target else {
        error!("No target format given");
        std::process::exit(1);
    };

    let mut options = config
        .options_for(target)
        .with_resize(ResizeOptions {
            mode: args.resize_mode,
            target_width: args.width,
            target_height: args.height,
            maintain_aspect_ratio: !args.ignore_aspect,
        })
        .with_target_size_kb(args.target_kb);
    if let Some(quality) = args.quality {
        options = options.with_quality(quality);
    }
    if let Some(output) = args.output {
        options = options.with_output_path(output);
    }
    if args.overwrite {
        options = options.with_overwrite(true);
    }

    let result = converter.convert(&args.source, &options).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.success {
        info!("Conversion completed successfully");
        Ok(())
    } else {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;
    use image_converter::{ImageFormatKind, ResizeMode};

    #[test]
    fn test_parse_conversion_args() {
        let args = CliArgs::try_parse_from([
            "image-converter",
            "photo.png",
            "--to",
            "jpg",
            "--resize-mode",
            "max-width",
            "--width",
            "640",
            "--target-kb",
            "50",
        ])
        .unwrap();
        assert_eq!(args.target, Some(ImageFormatKind::Jpeg));
        assert_eq!(args.resize_mode, ResizeMode::MaxWidth);
        assert_eq!(args.width, 640);
        assert_eq!(args.target_kb, 50);
        assert!(!args.ignore_aspect);
    }

    #[test]
    fn test_target_required_unless_info() {
        assert!(CliArgs::try_parse_from(["image-converter", "photo.png"]).is_err());
        assert!(CliArgs::try_parse_from(["image-converter", "photo.png", "--info"]).is_ok());
    }

    #[test]
    fn test_quality_out_of_range() {
        let err = CliArgs::try_parse_from([
            "image-converter",
            "photo.png",
            "--to",
            "png",
            "--quality",
            "101",
        ]);
        assert!(err.is_err());
    }
}

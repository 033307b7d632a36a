//! SVG rasterization.
//!
//! Renders a parsed document onto a fixed-size RGBA canvas using `resvg`.

use super::resize::compute_dimensions;
use crate::models::ResizeOptions;
use crate::{Error, Result};
use image::RgbaImage;
use resvg::tiny_skia::{Color, Pixmap, Rect, Transform};
use resvg::usvg::{self, fontdb, Tree};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static FONT_DATABASE: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn shared_fonts() -> Arc<fontdb::Database> {
    FONT_DATABASE
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!("Loaded {} font faces for SVG text", db.len());
            Arc::new(db)
        })
        .clone()
}

fn parse(svg_data: &[u8], resources_dir: Option<&Path>) -> Result<Tree> {
    let mut options = usvg::Options::default();
    options.resources_dir = resources_dir.map(Path::to_path_buf);
    options.fontdb = shared_fonts();

    Tree::from_data(svg_data, &options)
        .map_err(|e| Error::VectorParse(format!("Failed to parse SVG: {}", e)))
}

/// Document bounding box in user units.
fn bounds(tree: &Tree) -> Result<Rect> {
    let size = tree.size();
    Rect::from_xywh(0.0, 0.0, size.width(), size.height())
        .filter(|rect| rect.width() > 0.0 && rect.height() > 0.0)
        .ok_or_else(|| {
            Error::VectorParse(format!(
                "SVG has an empty bounding box ({}x{})",
                size.width(),
                size.height()
            ))
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn intrinsic_size(rect: &Rect) -> (u32, u32) {
    (
        (rect.width().ceil() as u32).max(1),
        (rect.height().ceil() as u32).max(1),
    )
}

/// Intrinsic pixel size of an SVG document.
pub fn document_size(svg_data: &[u8], resources_dir: Option<&Path>) -> Result<(u32, u32)> {
    let tree = parse(svg_data, resources_dir)?;
    Ok(intrinsic_size(&bounds(&tree)?))
}

/// Rasterized document plus the size it was authored at.
#[derive(Debug)]
pub struct Rasterized {
    pub image: RgbaImage,
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
}

/// Parse `svg_data` and paint it onto a canvas sized by `resize`.
///
/// The canvas starts fully transparent when `transparent` is set, opaque
/// white otherwise. X and Y are scaled independently onto the canvas.
pub fn rasterize(
    svg_data: &[u8],
    resources_dir: Option<&Path>,
    resize: &ResizeOptions,
    transparent: bool,
) -> Result<Rasterized> {
    let tree = parse(svg_data, resources_dir)?;
    let rect = bounds(&tree)?;
    let (intrinsic_width, intrinsic_height) = intrinsic_size(&rect);
    let (width, height) = compute_dimensions(intrinsic_width, intrinsic_height, resize);

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        Error::VectorParse(format!("Cannot allocate a {}x{} canvas", width, height))
    })?;
    if !transparent {
        pixmap.fill(Color::WHITE);
    }

    let scale_x = width as f32 / rect.width();
    let scale_y = height as f32 / rect.height();
    let transform =
        Transform::from_scale(scale_x, scale_y).pre_translate(-rect.left(), -rect.top());
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    tracing::debug!(
        "Rasterized SVG {}x{} -> {}x{}",
        intrinsic_width,
        intrinsic_height,
        width,
        height
    );

    // tiny-skia stores premultiplied alpha
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let image = RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| Error::Invariant("Rasterized buffer size mismatch".to_string()))?;

    Ok(Rasterized {
        image,
        intrinsic_width,
        intrinsic_height,
    })
}

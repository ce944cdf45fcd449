//! In-process fallback backend over `resvg`/`usvg`/`tiny-skia`
//!
//! Pure-Rust rendering with no system dependencies, so this backend is
//! always available. Filter and mask support is more limited than
//! Inkscape's, which is why it runs second.

use super::{RenderOptions, Rasterizer};
use crate::{Error, Result};
use log::debug;
use std::path::Path;

pub struct ResvgRasterizer;

impl Rasterizer for ResvgRasterizer {
    fn name(&self) -> &'static str {
        "resvg"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn rasterize(&self, svg_content: &str, output: &Path, opts: &RenderOptions) -> Result<()> {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();

        let tree = usvg::Tree::from_str(svg_content, &options)
            .map_err(|e| Error::RenderError(format!("SVG parse failed: {}", e)))?;

        let size = tree.size();
        let (width, height, scale_x, scale_y) = target_dimensions(size.width(), size.height(), opts);
        debug!("Rendering {}x{} pixmap (scale {}x{})", width, height, scale_x, scale_y);

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::RenderError("Cannot create a zero-sized pixmap".into()))?;

        // Pixmap starts fully transparent; nothing else touches the background.
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale_x, scale_y),
            &mut pixmap.as_mut(),
        );

        pixmap
            .save_png(output)
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
        Ok(())
    }
}

/// Compute the pixmap size and the scale from document units to pixels.
///
/// A single requested dimension scales the other proportionally; two
/// requested dimensions stretch independently, matching Inkscape's
/// `--export-width`/`--export-height` behavior.
fn target_dimensions(
    intrinsic_w: f32,
    intrinsic_h: f32,
    opts: &RenderOptions,
) -> (u32, u32, f32, f32) {
    let (scale_x, scale_y) = match (opts.width, opts.height) {
        (None, None) => (1.0, 1.0),
        (Some(w), None) => {
            let s = w as f32 / intrinsic_w;
            (s, s)
        }
        (None, Some(h)) => {
            let s = h as f32 / intrinsic_h;
            (s, s)
        }
        (Some(w), Some(h)) => (w as f32 / intrinsic_w, h as f32 / intrinsic_h),
    };
    let width = (intrinsic_w * scale_x).ceil().max(1.0) as u32;
    let height = (intrinsic_h * scale_y).ceil().max(1.0) as u32;
    (width, height, scale_x, scale_y)
}

//! Rasterizer backends
//!
//! Two implementations of the [`Rasterizer`] trait: an Inkscape subprocess
//! (primary, best fidelity for filters and masks) and the in-process `resvg`
//! stack (fallback, always available). The converter tries them in order.

use crate::Result;
use std::path::{Path, PathBuf};

mod inkscape;
mod resvg_backend;

pub use inkscape::InkscapeRasterizer;
pub use resvg_backend::ResvgRasterizer;

/// Sizing options forwarded to a rasterizer backend
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Output width in pixels; `None` keeps the intrinsic width
    pub width: Option<u32>,
    /// Output height in pixels; `None` keeps the intrinsic height
    pub height: Option<u32>,
}

/// A backend that turns SVG text into a PNG file on disk
pub trait Rasterizer {
    /// Human-readable backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Whether this backend can run on the current system
    fn is_available(&self) -> bool;

    /// Render `svg_content` to a PNG at `output`, preserving transparency
    fn rasterize(&self, svg_content: &str, output: &Path, opts: &RenderOptions) -> Result<()>;
}

/// Locate an executable on `PATH`.
pub(crate) fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let candidate = dir.join(format!("{}.exe", name));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Per-user cache directory used for the temporary SVG handed to Inkscape.
///
/// `$XDG_CACHE_HOME/svg2png`, falling back to `~/.cache/svg2png`, falling
/// back to the system temp directory.
pub(crate) fn cache_dir() -> Result<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .unwrap_or_else(std::env::temp_dir);
    let dir = base.join("svg2png");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

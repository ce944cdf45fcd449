//! svg2png
//!
//! Converts an SVG document into a PNG image with true alpha transparency by
//! sequencing two external collaborators: a headless browser (to execute any
//! embedded `<script>` logic and serialize the resulting markup) and a vector
//! rasterizer (Inkscape on the command line, falling back to the in-process
//! `resvg` stack when Inkscape is unavailable or fails).
//!
//! # Pipeline
//!
//! 1. Read the SVG file as text.
//! 2. If the text contains a `<script>` element, load it into a headless
//!    browser wrapped in a minimal HTML shell, wait for the DOM to settle and
//!    extract the serialized `<svg>` element. Otherwise pass the text through.
//! 3. Rasterize with the first working backend, preserving transparency.
//!
//! # Example
//!
//! ```no_run
//! use svg2png::{Converter, ConvertConfig};
//!
//! # fn main() -> svg2png::Result<()> {
//! let config = ConvertConfig {
//!     width: Some(512),
//!     ..Default::default()
//! };
//!
//! let converter = Converter::new(config);
//! converter.convert_file("drawing.svg".as_ref(), "drawing.png".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

// Browser-based script pre-processor (requires a local Chrome/Chromium)
#[cfg(feature = "browser")]
pub mod browser;

// Rasterizer backends (Inkscape subprocess + in-process resvg fallback)
pub mod raster;

pub mod convert;
pub use convert::Converter;
pub use raster::{RenderOptions, Rasterizer};

/// Configuration for a conversion run
///
/// The defaults mirror the behavior of the standalone tool: a headless
/// browser with a desktop-sized viewport, a bounded wait for the `<svg>`
/// element to appear, and a fixed settle interval that gives inline scripts
/// time to finish mutating the DOM.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Output PNG width in pixels; `None` keeps the document's intrinsic width
    pub width: Option<u32>,
    /// Output PNG height in pixels; `None` keeps the document's intrinsic height
    pub height: Option<u32>,
    /// Browser viewport used while executing embedded scripts
    pub viewport: Viewport,
    /// Maximum time to wait for an `<svg>` element to appear, in milliseconds
    pub dom_timeout_ms: u64,
    /// Fixed interval to let scripts finish after the element appears, in milliseconds
    pub settle_ms: u64,
    /// Whether to run the browser headless (only disabled for debugging)
    pub headless: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            viewport: Viewport::default(),
            dom_timeout_ms: 10_000,
            settle_ms: 2_000,
            headless: true,
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.viewport.width, 1920);
        assert_eq!(config.viewport.height, 1080);
        assert_eq!(config.dom_timeout_ms, 10_000);
        assert!(config.headless);
        assert!(config.width.is_none());
        assert!(config.height.is_none());
    }
}

//! Conversion pipeline
//!
//! Ties the stages together: script detection, optional browser
//! pre-processing, then rasterization with primary/fallback backends.

use crate::raster::{InkscapeRasterizer, RenderOptions, Rasterizer, ResvgRasterizer};
use crate::{ConvertConfig, Error, Result};
use log::{debug, info, warn};
use scraper::{Html, Selector};
use std::path::Path;

/// Returns true if the SVG text carries an embedded `<script>` element.
///
/// Parses the markup instead of substring-matching so that an attributed
/// script tag (`<script type="text/javascript">`) is detected and the word
/// "script" in text content is not.
pub fn has_embedded_script(svg_content: &str) -> bool {
    let selector = Selector::parse("script").expect("static selector");
    let fragment = Html::parse_fragment(svg_content);
    fragment.select(&selector).next().is_some()
}

/// One-shot SVG-to-PNG converter
///
/// Holds the configuration and the ordered backend list. Each `convert`
/// call is fully isolated; the converter itself carries no mutable state.
pub struct Converter {
    config: ConvertConfig,
    backends: Vec<Box<dyn Rasterizer>>,
}

impl Converter {
    /// Create a converter with the default backend order: Inkscape first,
    /// the in-process resvg fallback second.
    pub fn new(config: ConvertConfig) -> Self {
        let backends: Vec<Box<dyn Rasterizer>> = vec![
            Box::new(InkscapeRasterizer::new()),
            Box::new(ResvgRasterizer),
        ];
        Self { config, backends }
    }

    /// Create a converter with an explicit backend list (used by tests).
    pub fn with_backends(config: ConvertConfig, backends: Vec<Box<dyn Rasterizer>>) -> Self {
        Self { config, backends }
    }

    /// The configured backends, in the order they will be tried.
    pub fn backends(&self) -> &[Box<dyn Rasterizer>] {
        &self.backends
    }

    /// Whether at least one rasterizer backend can run on this system.
    pub fn any_backend_available(&self) -> bool {
        self.backends.iter().any(|b| b.is_available())
    }

    /// Convert SVG text to a PNG file at `output`.
    pub fn convert(&self, svg_content: &str, output: &Path) -> Result<()> {
        info!("Stage 1: processing embedded scripts");
        let processed = self.preprocess(svg_content);

        info!("Stage 2: rendering PNG");
        let opts = RenderOptions {
            width: self.config.width,
            height: self.config.height,
        };

        let mut any_available = false;
        let mut last_err = None;
        for backend in &self.backends {
            if !backend.is_available() {
                debug!("Skipping unavailable backend '{}'", backend.name());
                continue;
            }
            any_available = true;
            match backend.rasterize(&processed, output, &opts) {
                Ok(()) => {
                    info!("PNG rendered with {}: {}", backend.name(), output.display());
                    return Ok(());
                }
                Err(e) => {
                    warn!("Backend '{}' failed: {}", backend.name(), e);
                    last_err = Some(e);
                }
            }
        }

        if !any_available {
            return Err(Error::NoBackends);
        }
        Err(last_err.unwrap_or(Error::NoBackends))
    }

    /// Read an SVG file and convert it to a PNG file at `output`.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<()> {
        info!("Reading SVG from {}", input.display());
        let svg_content = std::fs::read_to_string(input)
            .map_err(|e| Error::InputError(format!("{}: {}", input.display(), e)))?;
        self.convert(&svg_content, output)
    }

    /// Run the browser pre-processor when the document needs it. Browser
    /// failures degrade to the raw text; only rasterization failures are
    /// fatal.
    fn preprocess(&self, svg_content: &str) -> String {
        if !has_embedded_script(svg_content) {
            debug!("No embedded script detected");
            return svg_content.to_string();
        }

        #[cfg(feature = "browser")]
        {
            info!("Embedded script detected, executing in headless browser");
            match crate::browser::ScriptProcessor::new(self.config.clone()).process(svg_content) {
                Ok(processed) => processed,
                Err(e) => {
                    warn!("Browser processing failed ({}), using the raw SVG", e);
                    svg_content.to_string()
                }
            }
        }

        #[cfg(not(feature = "browser"))]
        {
            warn!("Embedded script detected but built without browser support");
            svg_content.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_detects_bare_script_tag() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><script>circle()</script></svg>"#;
        assert!(has_embedded_script(svg));
    }

    #[test]
    fn test_detects_attributed_script_tag() {
        let svg = r#"<svg><script type="text/javascript">draw();</script></svg>"#;
        assert!(has_embedded_script(svg));
    }

    #[test]
    fn test_plain_svg_has_no_script() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="4" height="4"/></svg>"#;
        assert!(!has_embedded_script(svg));
    }

    #[test]
    fn test_script_as_text_content_is_not_a_script() {
        let svg = r#"<svg><text>script</text></svg>"#;
        assert!(!has_embedded_script(svg));
    }

    /// Scriptable stub backend for fallback-order tests
    struct StubBackend {
        name: &'static str,
        available: bool,
        fails: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Rasterizer for StubBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn rasterize(&self, _svg: &str, output: &Path, _opts: &RenderOptions) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                return Err(Error::RenderError("stub failure".into()));
            }
            std::fs::write(output, b"\x89PNG\r\n\x1a\nstub")?;
            Ok(())
        }
    }

    fn stub(name: &'static str, available: bool, fails: bool) -> (Box<dyn Rasterizer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = StubBackend {
            name,
            available,
            fails,
            calls: calls.clone(),
        };
        (Box::new(backend), calls)
    }

    #[test]
    fn test_primary_failure_falls_back_to_secondary() {
        let (primary, primary_calls) = stub("primary", true, true);
        let (secondary, secondary_calls) = stub("secondary", true, false);
        let converter = Converter::with_backends(ConvertConfig::default(), vec![primary, secondary]);

        let tmp = tempfile::tempdir().expect("tempdir");
        let out = tmp.path().join("out.png");
        converter.convert("<svg/>", &out).expect("fallback failed");

        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
        assert!(out.exists());
    }

    #[test]
    fn test_unavailable_primary_is_skipped_without_a_call() {
        let (primary, primary_calls) = stub("primary", false, true);
        let (secondary, _) = stub("secondary", true, false);
        let converter = Converter::with_backends(ConvertConfig::default(), vec![primary, secondary]);

        let tmp = tempfile::tempdir().expect("tempdir");
        converter
            .convert("<svg/>", &tmp.path().join("out.png"))
            .expect("secondary failed");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_backends_unavailable_is_no_backends() {
        let (primary, _) = stub("primary", false, false);
        let (secondary, _) = stub("secondary", false, false);
        let converter = Converter::with_backends(ConvertConfig::default(), vec![primary, secondary]);

        let tmp = tempfile::tempdir().expect("tempdir");
        let err = converter
            .convert("<svg/>", &tmp.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, Error::NoBackends));
        assert!(!converter.any_backend_available());
    }

    #[test]
    fn test_all_backends_failing_reports_last_error() {
        let (primary, _) = stub("primary", true, true);
        let (secondary, _) = stub("secondary", true, true);
        let converter = Converter::with_backends(ConvertConfig::default(), vec![primary, secondary]);

        let tmp = tempfile::tempdir().expect("tempdir");
        let err = converter
            .convert("<svg/>", &tmp.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, Error::RenderError(_)));
    }

    #[test]
    fn test_missing_input_file_is_an_input_error() {
        let converter = Converter::with_backends(ConvertConfig::default(), vec![]);
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = converter
            .convert_file(&tmp.path().join("missing.svg"), &tmp.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, Error::InputError(_)));
    }

    #[test]
    fn test_end_to_end_with_resvg_fallback() {
        // Real backend list; Inkscape is typically absent here, so this
        // exercises the resvg fallback end to end.
        let converter = Converter::new(ConvertConfig::default());
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><rect width="8" height="8" fill="green"/></svg>"#;

        let tmp = tempfile::tempdir().expect("tempdir");
        let out = tmp.path().join("out.png");
        converter.convert(svg, &out).expect("convert failed");

        let bytes = std::fs::read(&out).expect("read png");
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}

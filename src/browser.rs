//! Headless-browser script pre-processor (uses the `headless_chrome` crate)
//!
//! SVG documents may carry embedded `<script>` logic that builds or mutates
//! the image at load time. A static rasterizer never runs that logic, so the
//! document is loaded into a headless Chrome instance inside a minimal HTML
//! shell, the scripts are given time to run, and the serialized `<svg>`
//! element is read back for rasterization.

use crate::{ConvertConfig, Error, Result};
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::io::Write;
use std::time::Duration;

/// Executes embedded SVG scripts in a headless browser and returns the
/// post-execution markup.
///
/// Each call launches a fresh browser instance; the instance and its
/// temporary HTML wrapper file are torn down before the call returns.
pub struct ScriptProcessor {
    config: ConvertConfig,
}

impl ScriptProcessor {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Run the SVG through the browser and return the serialized `<svg>`
    /// element after script execution.
    ///
    /// Callers should treat an `Err` as "use the raw SVG text instead":
    /// a missing Chrome installation or a page that never produces an
    /// `<svg>` element degrades the pipeline, it does not abort it.
    pub fn process(&self, svg_content: &str) -> Result<String> {
        let html = html_wrapper(svg_content);

        let mut temp_html = tempfile::Builder::new()
            .prefix("svg2png-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| Error::BrowserError(format!("Failed to create wrapper file: {}", e)))?;
        temp_html
            .write_all(html.as_bytes())
            .map_err(|e| Error::BrowserError(format!("Failed to write wrapper file: {}", e)))?;

        let url = format!("file://{}", temp_html.path().display());
        debug!("Loading HTML wrapper: {}", url);

        let launch_options = LaunchOptions::default_builder()
            .headless(self.config.headless)
            .window_size(Some((self.config.viewport.width, self.config.viewport.height)))
            .build()
            .map_err(|e| Error::BrowserError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::BrowserError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::BrowserError(format!("Failed to create tab: {}", e)))?;

        tab.navigate_to(&url)
            .map_err(|e| Error::BrowserError(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::BrowserError(format!("Wait for navigation failed: {}", e)))?;

        // The scripts may build the <svg> element themselves, so wait for it
        // rather than assuming it exists at load time.
        tab.wait_for_element_with_custom_timeout(
            "svg",
            Duration::from_millis(self.config.dom_timeout_ms),
        )
        .map_err(|_| Error::Timeout(self.config.dom_timeout_ms))?;

        // Scripts may keep mutating the DOM after the element appears.
        std::thread::sleep(Duration::from_millis(self.config.settle_ms));

        let eval = tab
            .evaluate(
                r#"
                (function() {
                    const svg = document.querySelector('svg');
                    return svg ? svg.outerHTML : '';
                })()
                "#,
                false,
            )
            .map_err(|e| Error::BrowserError(format!("Evaluation failed: {}", e)))?;

        let markup = eval
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        if markup.is_empty() {
            warn!("Browser produced no <svg> markup, keeping the raw document");
            return Ok(svg_content.to_string());
        }

        debug!("Extracted {} bytes of processed SVG", markup.len());
        Ok(markup)
    }
}

/// Wrap SVG markup in a minimal HTML shell with a transparent background.
///
/// The transparent body matters: some scripts read computed styles, and the
/// serialized markup must not pick up an opaque page background.
pub(crate) fn html_wrapper(svg_content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ margin: 0; padding: 0; background: transparent; }}
        svg {{ background: transparent; }}
    </style>
</head>
<body>
{}
</body>
</html>
"#,
        svg_content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_embeds_svg() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="4" height="4"/></svg>"#;
        let html = html_wrapper(svg);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(svg));
    }

    #[test]
    fn test_wrapper_forces_transparent_background() {
        let html = html_wrapper("<svg/>");
        assert!(html.contains("background: transparent"));
        assert!(html.contains("margin: 0"));
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_process_static_svg_roundtrip() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><circle cx="5" cy="5" r="4" fill="red"/></svg>"#;
        let processor = ScriptProcessor::new(ConvertConfig {
            settle_ms: 100,
            ..Default::default()
        });
        let processed = processor.process(svg).expect("browser processing failed");
        assert!(processed.contains("<circle"));
    }
}

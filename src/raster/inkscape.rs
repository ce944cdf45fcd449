//! Inkscape subprocess backend
//!
//! Invokes the Inkscape CLI with transparency-preserving export flags. A
//! native `inkscape` on `PATH` is preferred; a Flatpak installation
//! (`flatpak run org.inkscape.Inkscape`) is used when only `flatpak` is found.

use super::{cache_dir, find_in_path, RenderOptions, Rasterizer};
use crate::{Error, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

const FLATPAK_APP_ID: &str = "org.inkscape.Inkscape";

/// How to launch Inkscape on this system
#[derive(Debug, Clone)]
enum Invocation {
    Native(PathBuf),
    Flatpak,
}

/// Primary rasterizer backend: the Inkscape command-line exporter
pub struct InkscapeRasterizer {
    invocation: Option<Invocation>,
}

impl InkscapeRasterizer {
    /// Probe `PATH` for a usable Inkscape installation.
    pub fn new() -> Self {
        let invocation = if let Some(bin) = find_in_path("inkscape") {
            debug!("Found native Inkscape at {}", bin.display());
            Some(Invocation::Native(bin))
        } else if find_in_path("flatpak").is_some() {
            debug!("Found 'flatpak', will run {}", FLATPAK_APP_ID);
            Some(Invocation::Flatpak)
        } else {
            None
        };
        Self { invocation }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        match invocation {
            Invocation::Native(bin) => Command::new(bin),
            Invocation::Flatpak => {
                let mut cmd = Command::new("flatpak");
                cmd.args(["run", FLATPAK_APP_ID]);
                cmd
            }
        }
    }
}

impl Default for InkscapeRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for InkscapeRasterizer {
    fn name(&self) -> &'static str {
        "inkscape"
    }

    fn is_available(&self) -> bool {
        self.invocation.is_some()
    }

    fn rasterize(&self, svg_content: &str, output: &Path, opts: &RenderOptions) -> Result<()> {
        let invocation = self
            .invocation
            .as_ref()
            .ok_or_else(|| Error::RenderError("Inkscape is not installed".into()))?;

        // Inkscape needs a file path; a Flatpak Inkscape additionally needs
        // one it can see from inside its sandbox, hence the user cache dir
        // rather than /tmp.
        let dir = cache_dir()?;
        let mut temp_svg = tempfile::Builder::new()
            .prefix("svg2png-")
            .suffix(".svg")
            .tempfile_in(&dir)
            .map_err(|e| Error::RenderError(format!("Failed to create temp SVG: {}", e)))?;
        temp_svg
            .write_all(svg_content.as_bytes())
            .map_err(|e| Error::RenderError(format!("Failed to write temp SVG: {}", e)))?;
        debug!("Created temporary SVG at {}", temp_svg.path().display());

        let mut cmd = self.command(invocation);
        cmd.arg(format!("--export-filename={}", output.display()))
            .arg("--export-type=png")
            .arg("--export-background-opacity=0");
        if let Some(width) = opts.width {
            cmd.arg(format!("--export-width={}", width));
        }
        if let Some(height) = opts.height {
            cmd.arg(format!("--export-height={}", height));
        }
        cmd.arg(temp_svg.path());
        debug!("Executing {:?}", cmd);

        let result = cmd
            .output()
            .map_err(|e| Error::RenderError(format!("Failed to spawn Inkscape: {}", e)))?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            info!("Inkscape: {}", stdout.trim());
        }
        let stderr = String::from_utf8_lossy(&result.stderr);
        if !stderr.trim().is_empty() {
            warn!("Inkscape stderr: {}", stderr.trim());
        }

        if !result.status.success() {
            return Err(Error::RenderError(format!(
                "Inkscape exited with {}",
                result.status
            )));
        }

        // Inkscape sometimes exits 0 without writing anything (e.g. bad
        // export path inside the Flatpak sandbox).
        match std::fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(Error::RenderError(
                "Inkscape reported success but the output file is missing or empty".into(),
            )),
        }
    }
}

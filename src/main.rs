use clap::Parser;
use log::warn;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use svg2png::{ConvertConfig, Converter};

/// Convert SVG to PNG with true alpha transparency
#[derive(Parser)]
#[command(name = "svg2png", version, about)]
struct Cli {
    /// Input SVG file path
    input: PathBuf,

    /// Output PNG file path
    output: PathBuf,

    /// Output PNG width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output PNG height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Open the generated PNG with the OS default viewer
    #[arg(long)]
    open: bool,

    /// Enable verbose output for debugging
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stdout)
        .init();

    let config = ConvertConfig {
        width: cli.width,
        height: cli.height,
        ..Default::default()
    };
    let converter = Converter::new(config);

    println!("Available renderers:");
    for backend in converter.backends() {
        let mark = if backend.is_available() { "yes" } else { "no" };
        println!("  - {}: {}", backend.name(), mark);
    }
    if !converter.any_backend_available() {
        eprintln!("Error: no rendering backends available");
        eprintln!("Install Inkscape natively or via Flatpak (org.inkscape.Inkscape).");
        return ExitCode::FAILURE;
    }

    match converter.convert_file(&cli.input, &cli.output) {
        Ok(()) => {
            println!("Conversion completed successfully");
            if cli.open {
                if let Err(e) = open_file(&cli.output) {
                    warn!("Could not open {}: {}", cli.output.display(), e);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Conversion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Open a file with the platform's default handler.
fn open_file(path: &Path) -> std::io::Result<()> {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()?
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).status()?
    } else {
        Command::new("xdg-open").arg(path).status()?
    };

    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("opener exited with {}", status),
        ))
    }
}

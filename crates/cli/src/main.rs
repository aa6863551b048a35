//! palmlines CLI
//!
//! Command-line interface for reading palm photographs offline.
//! Writes the line mask and overlays next to a narrative per image.
//!
//! Copyright (c) 2025 Michael A Wright

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use palm_pipeline::measure::measure_encoded;
use palm_pipeline::render::{render_overlay, trace_lines};
use palm_pipeline::{LineFeatures, LineRole, NamedLines, PalmReader};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt:  ",
    env!("PALMLINES_BUILD_TIME"),
    "\nhost:   ",
    env!("PALMLINES_BUILD_HOST"),
    "\ncommit: ",
    env!("PALMLINES_GIT_COMMIT"),
);

#[derive(Parser)]
#[command(name = "palmlines")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Find the major palm lines in a photograph and read them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a palm photograph, or every image under a directory
    Analyze {
        /// Input image file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for masks and overlays
        #[arg(short, long)]
        output: PathBuf,

        /// Also draw each line in its role colour
        #[arg(long)]
        trace: bool,

        /// Print a JSON report instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Measure a polyline given as "x,y x,y ..."
    Measure {
        /// Polyline points
        polyline: String,
    },
}

/// Per-image result printed with `--json`
#[derive(Debug, Serialize)]
struct Report {
    source: PathBuf,
    narrative: String,
    lines: NamedLines,
    features: BTreeMap<LineRole, LineFeatures>,
    analyzed_at: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            trace,
            json,
        } => run_analyze(&input, &output, trace, json),
        Commands::Measure { polyline } => {
            let features = measure_encoded(&polyline);
            println!("length:    {:.3}", features.length);
            println!("curvature: {:.6}", features.curvature);
            Ok(())
        }
    }
}

fn run_analyze(input: &Path, output: &Path, trace: bool, json: bool) -> Result<()> {
    let images = collect_images(input);
    if images.is_empty() {
        anyhow::bail!("No images found at {}", input.display());
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let reader = PalmReader::new();
    let mut analyzed = 0;
    for path in &images {
        match analyze_one(&reader, path, output, trace) {
            Ok(report) => {
                analyzed += 1;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}: {}", path.display(), report.narrative);
                }
            }
            Err(err) => tracing::warn!("Skipping {}: {:#}", path.display(), err),
        }
    }

    tracing::info!("Analyzed {} of {} images", analyzed, images.len());
    if analyzed == 0 {
        anyhow::bail!("None of the {} images could be analyzed", images.len());
    }
    Ok(())
}

fn analyze_one(reader: &PalmReader, path: &Path, output: &Path, trace: bool) -> Result<Report> {
    let image = palm_pipeline::load_image(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let result = reader.analyze(&image)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "palm".to_string());
    let (width, height) = result.visualization.dimensions();

    let mask_path = output.join(format!("{stem}_mask.png"));
    result
        .visualization
        .save(&mask_path)
        .with_context(|| format!("Failed to write {}", mask_path.display()))?;

    let overlay_path = output.join(format!("{stem}_overlay.png"));
    render_overlay(&image, &result.visualization)
        .save(&overlay_path)
        .with_context(|| format!("Failed to write {}", overlay_path.display()))?;

    if trace {
        let lines_path = output.join(format!("{stem}_lines.png"));
        trace_lines(&image, &result.lines, width, height)
            .save(&lines_path)
            .with_context(|| format!("Failed to write {}", lines_path.display()))?;
    }

    Ok(Report {
        source: path.to_path_buf(),
        narrative: result.narrative,
        lines: result.lines,
        features: result.features,
        analyzed_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// A single file, or every image file under a directory in name order
fn collect_images(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_image(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

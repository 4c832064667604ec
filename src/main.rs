use clap::Parser;
use label_preprocess::{
    preprocess_batch, CropStrategy, EdgeMode, PreprocessError, PreprocessingResult, SourceImage,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[derive(Parser, Debug)]
#[command(name = "label-preprocess")]
#[command(about = "Prepare graded-card label photos for OCR")]
#[command(version)]
pub struct Args {
    /// Images to preprocess (JPEG, PNG, ...)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the processed PNGs
    #[arg(long, env = "LABEL_PREP_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// JSON file with preprocessing options (missing fields use defaults)
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Crop strategy: entropy, attention, color-based or fixed
    #[arg(long)]
    pub crop_strategy: Option<CropStrategy>,

    /// Height of the fixed crop as a fraction of the image height
    #[arg(long)]
    pub fixed_crop_ratio: Option<f32>,

    /// Edge enhancement mode: composite or laplacian
    #[arg(long)]
    pub edge_mode: Option<EdgeMode>,

    /// Skip the red-hue targeting pass
    #[arg(long)]
    pub no_red_hue: bool,

    /// Skip the contrast curve
    #[arg(long)]
    pub no_contrast: bool,

    /// Skip edge enhancement
    #[arg(long)]
    pub no_edges: bool,

    /// Skip the morphology pass
    #[arg(long)]
    pub no_morphology: bool,

    /// Skip histogram normalization
    #[arg(long)]
    pub no_normalize: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// One line of the JSON report printed per input
#[derive(Serialize)]
struct Report<'a> {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a PreprocessingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays a clean JSON report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from(args);
    let options = config.preprocessing_options()?;

    tracing::info!("Starting label-preprocess v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Options: {:?}", options);

    tokio::fs::create_dir_all(&config.out_dir).await?;

    // Read everything up front; unreadable files are reported, not fatal
    let mut readable = Vec::new();
    let mut failures = 0usize;
    for path in &config.inputs {
        match tokio::fs::read(path).await {
            Ok(bytes) => readable.push((path.clone(), SourceImage::new(bytes))),
            Err(e) => {
                failures += 1;
                print_report(&Report {
                    input: path.display().to_string(),
                    output: None,
                    result: None,
                    error: Some(format!("Failed to read file: {}", e)),
                    code: Some("READ_ERROR"),
                })?;
            }
        }
    }

    let (paths, sources): (Vec<PathBuf>, Vec<SourceImage>) = readable.into_iter().unzip();
    let results = preprocess_batch(sources, options).await;

    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(result) => {
                let output = output_path(&config.out_dir, path);
                let png = match result.processed.encode_png() {
                    Ok(png) => png,
                    Err(e) => {
                        failures += 1;
                        tracing::warn!("Failed to encode {}: {}", path.display(), e);
                        print_report(&error_report(path, &e))?;
                        continue;
                    }
                };
                if let Err(e) = tokio::fs::write(&output, png).await {
                    failures += 1;
                    tracing::warn!("Failed to write {}: {}", output.display(), e);
                    print_report(&Report {
                        input: path.display().to_string(),
                        output: Some(output.display().to_string()),
                        result: None,
                        error: Some(format!("Failed to write file: {}", e)),
                        code: Some("WRITE_ERROR"),
                    })?;
                    continue;
                }
                print_report(&Report {
                    input: path.display().to_string(),
                    output: Some(output.display().to_string()),
                    result: Some(&result),
                    error: None,
                    code: None,
                })?;
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("Failed to preprocess {}: {}", path.display(), e);
                print_report(&error_report(path, &e))?;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, config.inputs.len());
    }

    Ok(())
}

fn error_report<'a>(path: &Path, error: &PreprocessError) -> Report<'a> {
    Report {
        input: path.display().to_string(),
        output: None,
        result: None,
        error: Some(error.to_string()),
        code: Some(error.code()),
    }
}

fn print_report(report: &Report<'_>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}

/// `<out_dir>/<stem>.label.png`
fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    out_dir.join(format!("{}.label.png", stem))
}

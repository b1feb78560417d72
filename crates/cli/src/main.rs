use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use facestamp_core::compositing::domain::frame_compositor::FrameCompositor;
use facestamp_core::compositing::infrastructure::alpha_compositor::AlphaCompositor;
use facestamp_core::compositing::infrastructure::resample::ResampleFilter;
use facestamp_core::detection::infrastructure::backend_factory::{create_locator, DetectorKind};
use facestamp_core::imaging::domain::image_writer::ImageWriter;
use facestamp_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facestamp_core::imaging::infrastructure::image_loader::load_image;
use facestamp_core::pipeline::pipeline_logger::LogPipelineLogger;
use facestamp_core::pipeline::stamp_image_use_case::StampImageUseCase;
use facestamp_core::shared::constants::{DEFAULT_OVERLAY_PATH, IMAGE_EXTENSIONS};
use facestamp_core::shared::overlay::OverlayImage;

/// Stamp an overlay image over every face in a photo.
#[derive(Parser)]
#[command(name = "facestamp")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Output image file (format follows the extension).
    output: PathBuf,

    /// Overlay image with an alpha channel.
    #[arg(long, default_value = DEFAULT_OVERLAY_PATH)]
    overlay: PathBuf,

    /// Face detector: yolo or blazeface.
    #[arg(long, default_value = "yolo")]
    detector: DetectorKind,

    /// ONNX model file (default: cached or downloaded model for the detector).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0). Defaults per detector.
    #[arg(long)]
    confidence: Option<f64>,

    /// Overlay resampling filter: nearest, bilinear, bicubic, lanczos3.
    #[arg(long, default_value = "bicubic")]
    resample: ResampleFilter,

    /// Exit with an error instead of running unstamped when the overlay is unusable.
    #[arg(long)]
    require_overlay: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let compositor = build_compositor(&cli)?;
    let locator = create_locator(
        cli.detector,
        cli.model.as_deref(),
        cli.confidence,
        Some(Box::new(download_progress)),
    )?;

    let frame = load_image(&cli.input)?;
    log::info!(
        "Loaded {} ({}x{})",
        cli.input.display(),
        frame.width(),
        frame.height()
    );

    let mut use_case = StampImageUseCase::new(
        Box::new(locator),
        compositor,
        Box::new(LogPipelineLogger::new()),
    );
    let outcome = use_case.execute(frame)?;

    match outcome.faces_detected() {
        0 => eprintln!("No faces detected; writing the image unchanged"),
        n if outcome.stamped => eprintln!("Stamped {} of {n} face(s)", outcome.faces.len()),
        n => eprintln!("Detected {n} face(s); none stamped"),
    }

    ImageFileWriter::new().write(&cli.output, &outcome.image)?;
    log::info!("Output written to {}", cli.output.display());
    use_case.finish();
    Ok(())
}

/// Loads the overlay eagerly. An unusable overlay is fatal only with
/// `--require-overlay`; otherwise the run continues without stamping.
fn build_compositor(
    cli: &Cli,
) -> Result<Option<Box<dyn FrameCompositor>>, Box<dyn std::error::Error>> {
    match OverlayImage::load(&cli.overlay) {
        Ok(overlay) => {
            log::info!(
                "Overlay {} ({}x{}), resample={}",
                cli.overlay.display(),
                overlay.width(),
                overlay.height(),
                cli.resample
            );
            Ok(Some(Box::new(AlphaCompositor::new(
                Arc::new(overlay),
                cli.resample,
            ))))
        }
        Err(e) if cli.require_overlay => Err(e.into()),
        Err(e) => {
            log::warn!("{e}; faces will be detected but not stamped");
            eprintln!("Warning: {e}");
            Ok(None)
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_image(&cli.output) {
        return Err(format!(
            "Output must be an image file ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            cli.output.display()
        )
        .into());
    }
    if let Some(confidence) = cli.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {confidence}"
            )
            .into());
        }
    }
    if cli.detector == DetectorKind::Blazeface && cli.model.is_none() {
        return Err("--detector blazeface requires --model".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
    if total > 0 && downloaded >= total {
        eprintln!();
    }
}

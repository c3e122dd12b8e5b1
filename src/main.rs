use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use datscan_sbr::{
    Analyzer, Atlas, ScanLayout,
    config::{
        ATLAS_DIR_ENV, DEFAULT_FOLDER_PREFIX, DEFAULT_SCAN_SUBPATH, OutputConfig,
        default_atlas_dir,
    },
    fetch::{HARVARD_OXFORD_URL, load_or_fetch},
    output::OutputWriter,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "datscan-sbr",
    version,
    about = "Striatal SBR and asymmetry analysis of DaTscan SPECT volumes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the Harvard-Oxford max-probability atlases
    #[arg(long, global = true, env = ATLAS_DIR_ENV)]
    atlas_dir: Option<PathBuf>,

    /// Archive the atlases are downloaded from when missing
    #[arg(long, global = true, default_value = HARVARD_OXFORD_URL)]
    atlas_url: String,

    /// Fail instead of downloading missing atlases
    #[arg(long, global = true)]
    no_fetch: bool,

    /// Where CSV reports are written
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Also write one PNG per slice showing the mapped atlas regions
    #[arg(long, global = true)]
    overlay_dir: Option<PathBuf>,

    /// Name prefix of patient folders, followed by the patient number
    #[arg(long, global = true, default_value = DEFAULT_FOLDER_PREFIX)]
    folder_prefix: String,

    /// Scan location below each patient folder
    #[arg(long, global = true, default_value = DEFAULT_SCAN_SUBPATH)]
    scan_subpath: PathBuf,

    /// Log per-slice details
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a single DICOM scan
    File { path: PathBuf },
    /// Analyse every patient folder below a directory
    Folder { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let atlas_dir = match cli.atlas_dir.clone().or_else(default_atlas_dir) {
        Some(dir) => dir,
        None => bail!("no atlas directory given; pass --atlas-dir or set {ATLAS_DIR_ENV}"),
    };
    let atlas = if cli.no_fetch {
        Atlas::load_from_directory(&atlas_dir).map_err(anyhow::Error::from)
    } else {
        load_or_fetch(&atlas_dir, &cli.atlas_url).map_err(anyhow::Error::from)
    }
    .with_context(|| format!("Failed to load atlases from {}", atlas_dir.display()))?;

    let analyzer = Analyzer::new(&atlas);
    let layout = ScanLayout {
        folder_prefix: cli.folder_prefix.clone(),
        scan_subpath: cli.scan_subpath.clone(),
    };
    let output = OutputWriter::new(&OutputConfig {
        output_dir: cli.output_dir.clone(),
        overlay_dir: cli.overlay_dir.clone(),
    })
    .with_context(|| format!("Failed to create output directory: {}", cli.output_dir.display()))?;

    match &cli.command {
        Command::File { path } => {
            let (volume, analysis) = analyzer
                .analyze_scan(path, &layout)
                .with_context(|| format!("Failed to analyse {}", path.display()))?;
            for written in output
                .save_patient(&analyzer, &analysis, &volume)
                .with_context(|| format!("Failed to save patient {}", analysis.patient_number))?
            {
                debug!(file = %written.display(), "written");
            }
        }
        Command::Folder { path } => {
            let report = output
                .run_folder(&analyzer, path, &layout)
                .with_context(|| format!("Failed to process patient folder {}", path.display()))?;
            info!(
                completed = report.completed().count(),
                failed = report.failures().count(),
                "folder processed"
            );
        }
    }

    Ok(())
}

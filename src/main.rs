use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use yolo_dataset_split::config::{DEFAULT_DESTINATION, DEFAULT_TRAIN_FRACTION};
use yolo_dataset_split::{
    logging, split, ConflictPolicy, RelocationMode, SplitConfig, SplitReport, SplitResult,
    ValDirName,
};

/// Split an images/ + labels/ dataset into train and validation folders.
#[derive(Debug, Parser)]
#[command(name = "yolo-dataset-split", version)]
struct Args {
    /// Path to data folder containing images and labels
    #[arg(long = "datapath", visible_alias = "data-path")]
    datapath: PathBuf,

    /// Ratio of images for training (0.8 means 80%)
    #[arg(
        long = "train_pct",
        visible_alias = "train-pct",
        default_value_t = DEFAULT_TRAIN_FRACTION,
        allow_negative_numbers = true
    )]
    train_pct: f64,

    /// Root of the generated train/val tree
    #[arg(long = "output_path", visible_alias = "output-path", default_value = DEFAULT_DESTINATION)]
    output_path: PathBuf,

    /// Copy files or move them out of the source folder
    #[arg(long, value_enum, default_value_t = RelocationMode::Move)]
    mode: RelocationMode,

    /// Name of the validation folder
    #[arg(long = "val-name", value_enum, default_value_t = ValDirName::Val)]
    val_name: ValDirName,

    /// Fixed shuffle seed for a reproducible split
    #[arg(long)]
    seed: Option<u64>,

    /// Behavior when a destination file already exists
    /// [default: overwrite when copying, skip when moving]
    #[arg(long = "on-conflict", value_enum)]
    on_conflict: Option<ConflictPolicy>,

    /// Remove source directories left empty after moving
    #[arg(long = "prune-empty")]
    prune_empty: bool,

    /// Write a JSON report of the split to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also write logs to a timestamped file in this directory
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn to_config(&self) -> SplitConfig {
        SplitConfig {
            source_path: self.datapath.clone(),
            train_fraction: self.train_pct,
            destination_path: self.output_path.clone(),
            relocation_mode: self.mode,
            val_dir_name: self.val_name,
            seed: self.seed,
            on_conflict: self.on_conflict,
            prune_empty_dirs: self.prune_empty,
        }
    }
}

fn run(args: &Args) -> SplitResult<SplitReport> {
    let config = args.to_config();
    info!(
        "Splitting {:?} into {:?} ({} mode, train fraction {})",
        config.source_path,
        config.destination_path,
        config.relocation_mode.as_str(),
        config.train_fraction
    );

    let report = split(&config)?;
    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    if report.has_failures() {
        warn!(
            "{} files could not be relocated, see warnings above",
            report.failures.len()
        );
    }
    Ok(report)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::setup_logging(args.verbose, args.log_dir.as_deref()) {
        eprintln!("Error: failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

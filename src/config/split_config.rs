use serde::Serialize;
use std::path::PathBuf;

use crate::error::{SplitError, SplitResult};

/// Lowest accepted training fraction (inclusive)
pub const MIN_TRAIN_FRACTION: f64 = 0.01;
/// Highest accepted training fraction (inclusive)
pub const MAX_TRAIN_FRACTION: f64 = 0.99;
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
pub const DEFAULT_DESTINATION: &str = "data";

/// How files reach the destination tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RelocationMode {
    /// Originals stay in place
    Copy,
    /// Originals are removed from the source tree
    #[default]
    Move,
}

impl RelocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelocationMode::Copy => "copy",
            RelocationMode::Move => "move",
        }
    }
}

/// What to do when a destination file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the source file where it is
    Skip,
    /// Replace the destination file
    Overwrite,
}

/// Directory name used for the validation split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValDirName {
    #[default]
    Val,
    Validation,
}

impl ValDirName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValDirName::Val => "val",
            ValDirName::Validation => "validation",
        }
    }
}

/// Everything a split run needs, validated once up front.
///
/// Built by the CLI from its arguments, or directly by library callers.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Directory holding the `images` and `labels` folders
    pub source_path: PathBuf,
    /// Fraction of samples routed to the training split
    pub train_fraction: f64,
    /// Root of the generated train/val tree
    pub destination_path: PathBuf,
    pub relocation_mode: RelocationMode,
    pub val_dir_name: ValDirName,
    /// Fixed shuffle seed; `None` draws from the thread-local RNG
    pub seed: Option<u64>,
    /// Overrides the conflict policy implied by `relocation_mode`
    pub on_conflict: Option<ConflictPolicy>,
    /// Remove directories emptied by moves (move mode only)
    pub prune_empty_dirs: bool,
}

impl SplitConfig {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            train_fraction: DEFAULT_TRAIN_FRACTION,
            destination_path: PathBuf::from(DEFAULT_DESTINATION),
            relocation_mode: RelocationMode::default(),
            val_dir_name: ValDirName::default(),
            seed: None,
            on_conflict: None,
            prune_empty_dirs: false,
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.source_path.join("images")
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.source_path.join("labels")
    }

    /// Copy overwrites, move skips, unless `on_conflict` says otherwise.
    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.on_conflict.unwrap_or(match self.relocation_mode {
            RelocationMode::Copy => ConflictPolicy::Overwrite,
            RelocationMode::Move => ConflictPolicy::Skip,
        })
    }

    /// Pruning only makes sense once files have actually been moved out.
    pub fn should_prune(&self) -> bool {
        self.prune_empty_dirs && self.relocation_mode == RelocationMode::Move
    }

    /// Check every input without touching the filesystem beyond metadata reads.
    pub fn validate(&self) -> SplitResult<()> {
        if !self.source_path.exists() {
            return Err(SplitError::path_not_found(
                &self.source_path,
                "directory does not exist, check --datapath",
            ));
        }
        if !self.source_path.is_dir() {
            return Err(SplitError::path_not_found(
                &self.source_path,
                "not a directory, check --datapath",
            ));
        }

        let images_dir = self.images_dir();
        if !images_dir.is_dir() {
            return Err(SplitError::path_not_found(
                images_dir,
                "source must contain an images folder",
            ));
        }

        // Written so that NaN fails as well
        if !(self.train_fraction >= MIN_TRAIN_FRACTION && self.train_fraction <= MAX_TRAIN_FRACTION)
        {
            return Err(SplitError::InvalidArgument {
                name: "--train_pct",
                message: format!(
                    "{} is out of range, must be between {} and {}",
                    self.train_fraction, MIN_TRAIN_FRACTION, MAX_TRAIN_FRACTION
                ),
            });
        }

        Ok(())
    }
}

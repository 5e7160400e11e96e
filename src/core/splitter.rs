//! Train/val split pipeline.
//!
//! Validates the configuration, prepares the output tree, discovers
//! image/label samples, shuffles and partitions them, then copies or moves
//! each file into its split. Per-file failures are recorded in the
//! [`SplitReport`] and do not stop the run.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::config::{ConflictPolicy, RelocationMode, SplitConfig, ValDirName};
use crate::core::dataset::{partition, Dataset, DatasetSplit, Partition, Sample};
use crate::core::operations::{prune_empty_dirs, relocate_file, RelocationOutcome};
use crate::error::{SplitError, SplitResult};

/// The four destination directories under an output root
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
    val_dir_name: ValDirName,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>, val_dir_name: ValDirName) -> Self {
        Self {
            root: root.into(),
            val_dir_name,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self, split: DatasetSplit) -> PathBuf {
        self.root.join(split.dir_name(self.val_dir_name)).join("images")
    }

    pub fn labels_dir(&self, split: DatasetSplit) -> PathBuf {
        self.root.join(split.dir_name(self.val_dir_name)).join("labels")
    }

    pub fn all_dirs(&self) -> Vec<PathBuf> {
        DatasetSplit::all()
            .into_iter()
            .flat_map(|split| [self.images_dir(split), self.labels_dir(split)])
            .collect()
    }

    /// Create all four directories; existing ones are reused.
    pub fn create(&self) -> SplitResult<()> {
        for dir in self.all_dirs() {
            fs::create_dir_all(&dir)
                .map_err(|e| SplitError::io(format!("failed to create {:?}", dir), e))?;
            debug!("Output directory ready: {:?}", dir);
        }
        Ok(())
    }
}

/// Per-split relocation counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitStats {
    /// Samples assigned to this split
    pub samples: usize,
    pub images_relocated: usize,
    pub labels_relocated: usize,
    /// Files already sitting at their destination (source inside the output tree)
    pub in_place: usize,
    /// Files left in place because the destination already existed
    pub skipped: usize,
    pub failed: usize,
}

/// A file that could not be relocated
#[derive(Debug, Clone, Serialize)]
pub struct RelocationFailure {
    pub path: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

/// Outcome of a split run
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub mode: RelocationMode,
    pub train_fraction: f64,
    pub seed: Option<u64>,
    /// Images discovered, labeled or not
    pub total_samples: usize,
    pub labeled_samples: usize,
    pub train: SplitStats,
    pub val: SplitStats,
    pub failures: Vec<RelocationFailure>,
    pub pruned_dirs: usize,
    /// Original source locations of each split's samples
    pub partition: Partition,
}

impl SplitReport {
    fn new(config: &SplitConfig, total_samples: usize, labeled_samples: usize) -> Self {
        Self {
            source_path: config.source_path.clone(),
            destination_path: config.destination_path.clone(),
            mode: config.relocation_mode,
            train_fraction: config.train_fraction,
            seed: config.seed,
            total_samples,
            labeled_samples,
            train: SplitStats::default(),
            val: SplitStats::default(),
            failures: Vec::new(),
            pruned_dirs: 0,
            partition: Partition::default(),
        }
    }

    pub fn stats(&self, split: DatasetSplit) -> &SplitStats {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
        }
    }

    fn stats_mut(&mut self, split: DatasetSplit) -> &mut SplitStats {
        match split {
            DatasetSplit::Train => &mut self.train,
            DatasetSplit::Val => &mut self.val,
        }
    }

    pub fn train_count(&self) -> usize {
        self.train.samples
    }

    pub fn val_count(&self) -> usize {
        self.val.samples
    }

    pub fn skipped_count(&self) -> usize {
        self.train.skipped + self.val.skipped
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> SplitResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SplitError::io(format!("failed to create {:?}", parent), e))?;
        }
        fs::write(path, json)
            .map_err(|e| SplitError::io(format!("failed to write report {:?}", path), e))?;
        info!("Split report written to {:?}", path);
        Ok(())
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Found {} images ({} with labels)",
            self.total_samples, self.labeled_samples
        )?;
        writeln!(f, "Train set: {} images", self.train_count())?;
        write!(f, "Validation set: {} images", self.val_count())?;
        if self.skipped_count() > 0 {
            write!(
                f,
                "\nSkipped {} files already present at the destination",
                self.skipped_count()
            )?;
        }
        if self.has_failures() {
            write!(f, "\nFailed to relocate {} files", self.failures.len())?;
        }
        if self.pruned_dirs > 0 {
            write!(f, "\nRemoved {} empty directories", self.pruned_dirs)?;
        }
        Ok(())
    }
}

/// Run a complete split as described by `config`.
///
/// Configuration errors are returned before anything on disk changes.
#[instrument(name = "split", skip(config), fields(source = ?config.source_path))]
pub fn split(config: &SplitConfig) -> SplitResult<SplitReport> {
    config.validate()?;

    let tree = OutputTree::new(&config.destination_path, config.val_dir_name);
    tree.create()?;

    let dataset = Dataset::discover(&config.images_dir(), &config.labels_dir(), &tree.all_dirs());
    let mut report = SplitReport::new(config, dataset.len(), dataset.labeled_count());

    let partition = partition(dataset.into_samples(), config.train_fraction, config.seed);
    let mut relocation = Relocation::new(&tree, config.relocation_mode, config.conflict_policy());

    for split in DatasetSplit::all() {
        let samples = partition.get(split);
        info!(
            "{} {} files to {} folder...",
            match config.relocation_mode {
                RelocationMode::Copy => "Copying",
                RelocationMode::Move => "Moving",
            },
            samples.len(),
            split.dir_name(config.val_dir_name)
        );
        relocation.relocate_samples(samples, split, &mut report);
    }

    if config.should_prune() {
        let keep = [tree.root().to_path_buf()];
        report.pruned_dirs = prune_empty_dirs(&config.images_dir(), &keep)
            + prune_empty_dirs(&config.labels_dir(), &keep);
        info!("Removed {} empty source directories", report.pruned_dirs);
    } else if config.prune_empty_dirs {
        debug!("Skipping empty directory pruning in copy mode");
    }

    report.partition = partition;
    info!(
        "Split complete: {} train, {} val, {} skipped, {} failed",
        report.train_count(),
        report.val_count(),
        report.skipped_count(),
        report.failures.len()
    );
    Ok(report)
}

/// Relocation settings shared by both splits of one run.
///
/// Pair rules:
/// - a label only follows its image when the image reached the destination
///   (relocated or already in place); a skipped or failed image keeps its
///   label at the source.
/// - each label file is relocated at most once per run. Nested images that
///   share a file stem all resolve to the same label, and only the first one
///   to land takes it along.
struct Relocation<'a> {
    tree: &'a OutputTree,
    mode: RelocationMode,
    on_conflict: ConflictPolicy,
    handled_labels: HashSet<PathBuf>,
}

impl<'a> Relocation<'a> {
    fn new(tree: &'a OutputTree, mode: RelocationMode, on_conflict: ConflictPolicy) -> Self {
        Self {
            tree,
            mode,
            on_conflict,
            handled_labels: HashSet::new(),
        }
    }

    /// Relocate every sample of one split, recording counts and failures.
    fn relocate_samples(&mut self, samples: &[Sample], split: DatasetSplit, report: &mut SplitReport) {
        let images_dir = self.tree.images_dir(split);
        let labels_dir = self.tree.labels_dir(split);
        report.stats_mut(split).samples = samples.len();

        for sample in samples {
            let image = self.relocate_one(&sample.image_path, &images_dir, split, report);
            match image {
                Some(RelocationOutcome::Relocated) => report.stats_mut(split).images_relocated += 1,
                Some(RelocationOutcome::InPlace) => report.stats_mut(split).in_place += 1,
                _ => {}
            }

            let Some(label_path) = &sample.label_path else {
                continue;
            };
            if !matches!(
                image,
                Some(RelocationOutcome::Relocated | RelocationOutcome::InPlace)
            ) {
                debug!("Leaving label {:?} with its image", label_path);
                continue;
            }
            if !self.handled_labels.insert(label_path.clone()) {
                debug!("Label {:?} already went with another image", label_path);
                continue;
            }

            match self.relocate_one(label_path, &labels_dir, split, report) {
                Some(RelocationOutcome::Relocated) => report.stats_mut(split).labels_relocated += 1,
                Some(RelocationOutcome::InPlace) => report.stats_mut(split).in_place += 1,
                _ => {}
            }
        }
    }

    /// `None` when the file could not be relocated; the failure is recorded.
    fn relocate_one(
        &self,
        src: &Path,
        dest_dir: &Path,
        split: DatasetSplit,
        report: &mut SplitReport,
    ) -> Option<RelocationOutcome> {
        let Some(file_name) = src.file_name() else {
            warn!("Skipping path without a file name: {:?}", src);
            return None;
        };
        let dest = dest_dir.join(file_name);

        match relocate_file(src, &dest, self.mode, self.on_conflict) {
            Ok(RelocationOutcome::Skipped) => {
                report.stats_mut(split).skipped += 1;
                Some(RelocationOutcome::Skipped)
            }
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Failed to relocate {:?}: {}", src, e);
                report.stats_mut(split).failed += 1;
                report.failures.push(RelocationFailure {
                    path: src.to_path_buf(),
                    destination: dest,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

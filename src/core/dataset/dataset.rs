use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use super::label::LabelIndex;

/// Recognized image extensions, compared case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// One image and its annotation, if it has one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub image_path: PathBuf,
    pub label_path: Option<PathBuf>,
}

impl Sample {
    pub fn is_labeled(&self) -> bool {
        self.label_path.is_some()
    }
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Files under `root` in path order.
///
/// Directories from `exclude` that sit strictly below `root` are not entered,
/// so an output tree nested inside the source is never read back as input.
/// An `exclude` entry equal to `root` has no effect.
pub(super) fn walk_files(root: &Path, exclude: &[PathBuf]) -> Vec<PathBuf> {
    let Ok(root_canonical) = fs::canonicalize(root) else {
        return Vec::new();
    };
    let nested: Vec<PathBuf> = exclude
        .iter()
        .filter_map(|dir| fs::canonicalize(dir).ok())
        .filter(|dir| dir != &root_canonical && dir.starts_with(&root_canonical))
        .collect();

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if nested.is_empty() || entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let inside = fs::canonicalize(entry.path())
                .map(|path| nested.iter().any(|dir| path.starts_with(dir)))
                .unwrap_or(false);
            if inside {
                debug!("Not descending into output directory {:?}", entry.path());
            }
            !inside
        });

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry under {:?}: {}", root, e),
        }
    }
    files
}

/// Every sample found under a source root, in path order
#[derive(Debug, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    /// Walk `images_root` recursively and pair each image with a label from
    /// `labels_root` by file stem. Directories listed in `exclude` (the
    /// output tree) are skipped when nested inside either root.
    #[instrument(name = "discover", skip(exclude))]
    pub fn discover(images_root: &Path, labels_root: &Path, exclude: &[PathBuf]) -> Self {
        let labels = LabelIndex::build(labels_root, exclude);

        let samples: Vec<Sample> = walk_files(images_root, exclude)
            .into_iter()
            .filter(|path| is_image_file(path))
            .map(|image_path| {
                let label_path = labels.lookup(&image_path).cloned();
                Sample {
                    image_path,
                    label_path,
                }
            })
            .collect();

        let dataset = Self { samples };
        info!(
            "Found {} images ({} labeled) in {:?}",
            dataset.len(),
            dataset.labeled_count(),
            images_root
        );
        dataset
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn labeled_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_labeled()).count()
    }
}

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::dataset::walk_files;

/// Annotation files preferred when several labels share a stem
const PREFERRED_LABEL_EXTENSION: &str = "txt";

/// Stem-keyed lookup of every file under a labels tree.
///
/// Built once per run so each image lookup is a map hit instead of a
/// directory walk.
#[derive(Debug, Default)]
pub struct LabelIndex {
    by_stem: HashMap<OsString, PathBuf>,
}

impl LabelIndex {
    /// Index all files under `labels_root`, descending into subfolders but
    /// not into nested `exclude` directories.
    ///
    /// A missing root yields an empty index. When two files share a stem the
    /// `.txt` one wins, otherwise the first in path order.
    pub fn build(labels_root: &Path, exclude: &[PathBuf]) -> Self {
        let mut index = Self::default();

        if !labels_root.is_dir() {
            warn!(
                "Labels folder {:?} not found, all samples will be unlabeled",
                labels_root
            );
            return index;
        }

        for path in walk_files(labels_root, exclude) {
            if let Some(stem) = path.file_stem() {
                index.insert(stem.to_os_string(), path);
            }
        }

        debug!("Indexed {} label files under {:?}", index.len(), labels_root);
        index
    }

    fn insert(&mut self, stem: OsString, path: PathBuf) {
        let replace = match self.by_stem.get(&stem) {
            None => true,
            Some(existing) => {
                warn!(
                    "Multiple label files share stem {:?}: {:?} and {:?}",
                    stem, existing, path
                );
                !is_preferred(existing) && is_preferred(&path)
            }
        };
        if replace {
            self.by_stem.insert(stem, path);
        }
    }

    /// Label for an image, matched on file stem.
    pub fn lookup(&self, image_path: &Path) -> Option<&PathBuf> {
        image_path.file_stem().and_then(|stem| self.by_stem.get(stem))
    }

    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }
}

fn is_preferred(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(PREFERRED_LABEL_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_gives_empty_index() {
        let dir = TempDir::new().unwrap();
        let index = LabelIndex::build(&dir.path().join("labels"), &[]);
        assert!(index.is_empty());
        assert!(index.lookup(Path::new("a.jpg")).is_none());
    }

    #[test]
    fn test_nested_labels_are_found() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("labels/batch_1/day");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("frame_001.txt"), "0 0.5 0.5 0.1 0.1").unwrap();

        let index = LabelIndex::build(&dir.path().join("labels"), &[]);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.lookup(Path::new("/images/other/frame_001.PNG")),
            Some(&nested.join("frame_001.txt"))
        );
        assert!(index.lookup(Path::new("frame_002.png")).is_none());
    }

    #[test]
    fn test_txt_preferred_on_stem_collision() {
        let dir = TempDir::new().unwrap();
        let labels = dir.path().join("labels");
        fs::create_dir_all(&labels).unwrap();
        fs::write(labels.join("img.json"), "{}").unwrap();
        fs::write(labels.join("img.txt"), "").unwrap();
        fs::write(labels.join("img.xml"), "").unwrap();

        let index = LabelIndex::build(&labels, &[]);
        assert_eq!(index.lookup(Path::new("img.jpg")), Some(&labels.join("img.txt")));
    }
}

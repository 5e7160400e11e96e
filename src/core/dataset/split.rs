use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use super::dataset::Sample;
use crate::config::ValDirName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSplit {
    Train,
    Val,
}

impl DatasetSplit {
    pub fn all() -> [DatasetSplit; 2] {
        [DatasetSplit::Train, DatasetSplit::Val]
    }

    /// Directory name of this split inside the output tree
    pub fn dir_name(&self, val_dir_name: ValDirName) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => val_dir_name.as_str(),
        }
    }
}

/// Disjoint train/val division of a dataset
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    pub train: Vec<Sample>,
    pub val: Vec<Sample>,
}

impl Partition {
    pub fn get(&self, split: DatasetSplit) -> &[Sample] {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of samples assigned to train: `floor(total * fraction)`.
pub fn train_count(total: usize, train_fraction: f64) -> usize {
    (total as f64 * train_fraction).floor() as usize
}

/// Split already-ordered samples at `train_count`, first part to train.
pub fn split_ordered(mut samples: Vec<Sample>, train_fraction: f64) -> Partition {
    let split_index = train_count(samples.len(), train_fraction).min(samples.len());
    let val = samples.split_off(split_index);
    Partition {
        train: samples,
        val,
    }
}

/// Shuffle with `rng` and split.
pub fn partition_with_rng<R: Rng + ?Sized>(
    mut samples: Vec<Sample>,
    train_fraction: f64,
    rng: &mut R,
) -> Partition {
    samples.shuffle(rng);
    split_ordered(samples, train_fraction)
}

/// Shuffle and split; a fixed `seed` makes membership reproducible.
pub fn partition(samples: Vec<Sample>, train_fraction: f64, seed: Option<u64>) -> Partition {
    let partition = match seed {
        Some(seed) => {
            debug!("Shuffling with fixed seed {}", seed);
            partition_with_rng(samples, train_fraction, &mut StdRng::seed_from_u64(seed))
        }
        None => partition_with_rng(samples, train_fraction, &mut rand::thread_rng()),
    };
    debug!(
        "Partitioned {} samples: {} train, {} val",
        partition.len(),
        partition.train.len(),
        partition.val.len()
    );
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample {
                image_path: PathBuf::from(format!("images/{:04}.jpg", i)),
                label_path: (i % 2 == 0).then(|| PathBuf::from(format!("labels/{:04}.txt", i))),
            })
            .collect()
    }

    fn image_set(samples: &[Sample]) -> HashSet<PathBuf> {
        samples.iter().map(|s| s.image_path.clone()).collect()
    }

    #[test]
    fn test_ten_samples_at_eighty_percent() {
        let partition = partition(samples(10), 0.8, None);
        assert_eq!(partition.train.len(), 8);
        assert_eq!(partition.val.len(), 2);
    }

    #[test]
    fn test_train_count_floors() {
        assert_eq!(train_count(0, 0.8), 0);
        assert_eq!(train_count(7, 0.5), 3);
        assert_eq!(train_count(99, 0.99), 98);
        assert_eq!(train_count(1, 0.99), 0);
        assert_eq!(train_count(3, 0.01), 0);
        assert_eq!(train_count(100, 0.01), 1);
    }

    #[test]
    fn test_empty_dataset() {
        let partition = partition(Vec::new(), 0.8, Some(1));
        assert!(partition.train.is_empty());
        assert!(partition.val.is_empty());
    }

    #[test]
    fn test_coverage_and_disjointness() {
        for n in [0, 1, 2, 5, 17, 100] {
            for fraction in [0.01, 0.25, 0.5, 0.8, 0.99] {
                let all = samples(n);
                let partition = partition(all.clone(), fraction, None);

                assert_eq!(partition.train.len(), train_count(n, fraction));
                assert_eq!(partition.len(), n);

                let train = image_set(&partition.train);
                let val = image_set(&partition.val);
                assert!(train.is_disjoint(&val));
                let union: HashSet<_> = train.union(&val).cloned().collect();
                assert_eq!(union, image_set(&all));
            }
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = partition(samples(50), 0.7, Some(42));
        let b = partition(samples(50), 0.7, Some(42));
        assert_eq!(a.train, b.train);
        assert_eq!(a.val, b.val);
    }

    #[test]
    fn test_split_ordered_keeps_order() {
        let partition = split_ordered(samples(4), 0.5);
        assert_eq!(partition.train, samples(4)[..2].to_vec());
        assert_eq!(partition.val, samples(4)[2..].to_vec());
        assert_eq!(partition.get(DatasetSplit::Val).len(), 2);
    }

    #[test]
    fn test_dir_names() {
        assert_eq!(DatasetSplit::Train.dir_name(ValDirName::Validation), "train");
        assert_eq!(DatasetSplit::Val.dir_name(ValDirName::Val), "val");
        assert_eq!(DatasetSplit::Val.dir_name(ValDirName::Validation), "validation");
    }

    #[test]
    fn test_dir_name_outlives_its_arguments() {
        let name: &'static str = {
            let val_dir_name = ValDirName::Validation;
            DatasetSplit::Val.dir_name(val_dir_name)
        };
        assert_eq!(name, "validation");

        let names: Vec<&'static str> = DatasetSplit::all()
            .iter()
            .map(|split| split.dir_name(ValDirName::default()))
            .collect();
        assert_eq!(names, ["train", "val"]);
    }
}

//! Split a YOLO-style `images/` + `labels/` folder into train and
//! validation sets.
//!
//! ```no_run
//! use yolo_dataset_split::{split, RelocationMode, SplitConfig};
//!
//! let mut config = SplitConfig::new("raw_dataset");
//! config.train_fraction = 0.9;
//! config.relocation_mode = RelocationMode::Copy;
//! let report = split(&config)?;
//! println!("{}", report);
//! # Ok::<(), yolo_dataset_split::SplitError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use config::{ConflictPolicy, RelocationMode, SplitConfig, ValDirName};
pub use crate::core::{split, Dataset, DatasetSplit, Partition, Sample, SplitReport};
pub use error::{SplitError, SplitResult};

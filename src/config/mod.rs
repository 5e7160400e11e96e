mod split_config;

pub use split_config::{
    ConflictPolicy, RelocationMode, SplitConfig, ValDirName, DEFAULT_DESTINATION,
    DEFAULT_TRAIN_FRACTION, MAX_TRAIN_FRACTION, MIN_TRAIN_FRACTION,
};

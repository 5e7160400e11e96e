mod dataset;
mod label;
mod split;

pub use dataset::{is_image_file, Dataset, Sample, IMAGE_EXTENSIONS};
pub use label::LabelIndex;
pub use split::{
    partition, partition_with_rng, split_ordered, train_count, DatasetSplit, Partition,
};

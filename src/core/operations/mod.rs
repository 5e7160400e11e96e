mod file_ops;

pub use file_ops::{
    copy_file, is_same_file, move_file, prune_empty_dirs, relocate_file, FileOpError, FileOpResult,
    RelocationOutcome,
};

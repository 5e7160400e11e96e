pub mod dataset;
pub mod operations;
pub mod splitter;

pub use dataset::*;
pub use operations::*;
pub use splitter::*;

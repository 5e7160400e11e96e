//! Logging for the dataset splitter
//!
//! This module provides:
//! - Custom log formatting with bracketed output
//! - Console logging on stderr, optionally mirrored to a file
//! - Timestamped log file names

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::{default_directive, log_file_name, setup_logging};

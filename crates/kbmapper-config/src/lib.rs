//! Configuration loading for kbmapper
//!
//! This crate parses KDL section files and assembles them into an ordered
//! [`ConfigStore`] that maps stimuli to commands.

mod error;
mod loader;
mod model;
mod parser;

pub use error::ConfigError;
pub use loader::{fragment_files, load_store, LoadReport, SkippedFile};
pub use model::*;
pub use parser::{parse_file, parse_str};

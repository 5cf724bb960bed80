//! Service ports: traits + data contracts.

pub mod file;
pub mod settings;

pub use file::{DirEntry, FileMetadata, FileProvider};
pub use settings::Settings;

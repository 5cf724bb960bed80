//! 数据模型层

pub mod document;
pub mod entry;
pub mod tag_set;

pub use document::{BufferId, BufferState, DocumentBuffer, DocumentFormat};
pub use entry::{EntryKind, EntryProperties, FileSystemEntry, Preview};
pub use tag_set::TagSet;

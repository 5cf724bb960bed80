//! Headless workspace core (tree/tags/clipboard/documents/audit).

pub mod audit;
pub mod batch;
pub mod clipboard;
pub mod documents;
pub mod engine;
pub mod error;
pub mod path_resolver;
pub mod services;
pub mod tree;

pub use audit::{AuditLog, AuditRecord, Severity};
pub use batch::{summarize, BatchItem, CancelFlag, DeleteItem, PasteItem, SaveItem};
pub use clipboard::{ClipboardController, ClipboardEntry, ClipboardMode};
pub use documents::{DocumentSessionManager, SaveMode};
pub use engine::{Engine, SharedEngine};
pub use error::{EngineError, ErrorKind, Result};
pub use path_resolver::PathResolver;
pub use tree::FileTreeModel;

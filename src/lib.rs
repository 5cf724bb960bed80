//! docman - 文档管理工作区引擎
//!
//! 模块结构：
//! - models: 数据模型（FileSystemEntry, TagSet, DocumentBuffer）
//! - kernel: 无界面核心（FileTreeModel, ClipboardController, DocumentSessionManager, AuditLog）
//! - kernel::services: 端口与适配器（FileProvider, Settings, 平台目录）

pub mod kernel;
pub mod models;

pub use kernel::{
    CancelFlag, ClipboardMode, Engine, EngineError, ErrorKind, Result, SaveMode, SharedEngine,
};
pub use models::{BufferId, BufferState, DocumentFormat, EntryKind, FileSystemEntry};

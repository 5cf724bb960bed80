//! 引擎错误类型
//!
//! 所有操作都返回结构化错误，文件系统错误附带出错路径。

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::BufferId;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug)]
pub enum EngineError {
    NotFound(PathBuf),
    AlreadyExists(PathBuf),
    InvalidParent(PathBuf),
    NotADirectory(PathBuf),
    PermissionDenied(PathBuf),
    MissingName,
    InvalidName(String),
    OutsideWorkspace(PathBuf),
    UnreadableFile { path: PathBuf, reason: String },
    CyclicDestination(PathBuf),
    UnknownBuffer(BufferId),
    Cancelled,
    Io { path: PathBuf, source: io::Error },
}

/// 不带数据的错误类别，便于调用方按类别匹配
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidParent,
    NotADirectory,
    PermissionDenied,
    MissingName,
    InvalidName,
    OutsideWorkspace,
    UnreadableFile,
    CyclicDestination,
    UnknownBuffer,
    Cancelled,
    Io,
}

impl EngineError {
    /// Maps an I/O failure onto the matching variant, keeping the offending path.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => EngineError::NotFound(path),
            io::ErrorKind::PermissionDenied => EngineError::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => EngineError::AlreadyExists(path),
            _ => EngineError::Io { path, source: err },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            EngineError::InvalidParent(_) => ErrorKind::InvalidParent,
            EngineError::NotADirectory(_) => ErrorKind::NotADirectory,
            EngineError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            EngineError::MissingName => ErrorKind::MissingName,
            EngineError::InvalidName(_) => ErrorKind::InvalidName,
            EngineError::OutsideWorkspace(_) => ErrorKind::OutsideWorkspace,
            EngineError::UnreadableFile { .. } => ErrorKind::UnreadableFile,
            EngineError::CyclicDestination(_) => ErrorKind::CyclicDestination,
            EngineError::UnknownBuffer(_) => ErrorKind::UnknownBuffer,
            EngineError::Cancelled => ErrorKind::Cancelled,
            EngineError::Io { .. } => ErrorKind::Io,
        }
    }

    /// 校验类错误在任何文件系统修改之前产生
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingName
                | ErrorKind::InvalidName
                | ErrorKind::InvalidParent
                | ErrorKind::CyclicDestination
                | ErrorKind::OutsideWorkspace
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotFound(p) => write!(f, "Not found: {}", p.display()),
            EngineError::AlreadyExists(p) => write!(f, "Already exists: {}", p.display()),
            EngineError::InvalidParent(p) => {
                write!(f, "Invalid parent (not a directory): {}", p.display())
            }
            EngineError::NotADirectory(p) => write!(f, "Not a directory: {}", p.display()),
            EngineError::PermissionDenied(p) => write!(f, "Permission denied: {}", p.display()),
            EngineError::MissingName => write!(f, "Missing name"),
            EngineError::InvalidName(name) => write!(f, "Invalid name: {:?}", name),
            EngineError::OutsideWorkspace(p) => {
                write!(f, "Path escapes the workspace root: {}", p.display())
            }
            EngineError::UnreadableFile { path, reason } => {
                write!(f, "Unreadable file {}: {}", path.display(), reason)
            }
            EngineError::CyclicDestination(p) => {
                write!(f, "Destination is inside a source: {}", p.display())
            }
            EngineError::UnknownBuffer(id) => write!(f, "Unknown buffer: {}", id),
            EngineError::Cancelled => write!(f, "Cancelled"),
            EngineError::Io { path, source } => {
                write!(f, "IO error at {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/error.rs"]
mod tests;

//! 文件系统 Provider trait
//!
//! 引擎的所有磁盘 I/O 都经过这里，便于替换后端或在测试中隔离。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::kernel::error::Result;

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl DirEntry {
    pub fn new(path: PathBuf, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            name,
            is_dir,
            is_file: !is_dir,
            is_symlink: false,
            size: 0,
            modified: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub is_dir: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub modified: Option<SystemTime>,
    pub readonly: bool,
}

impl FileMetadata {
    pub fn from_std(meta: fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            is_symlink: meta.is_symlink(),
            modified: meta.modified().ok(),
            readonly: meta.permissions().readonly(),
        }
    }
}

pub trait FileProvider: Send + Sync {
    /// 列出目录，按名称字母序排列（目录与文件交错）
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// 递归列出子树（不含 `path` 本身），深度优先、同级按名称排序
    fn walk(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// 以 UTF-8 读取；解码失败为 `UnreadableFile`
    fn read_file(&self, path: &Path) -> Result<String>;

    /// 读取文件开头至多 `max` 字节
    fn read_prefix(&self, path: &Path, max: usize) -> Result<(Vec<u8>, bool)>;

    /// 写入文件，必要时创建父目录
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    /// 创建空文件，已存在则失败
    fn create_file(&self, path: &Path) -> Result<()>;

    fn create_dir(&self, path: &Path) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// 删除文件或（递归）删除目录
    fn delete(&self, path: &Path) -> Result<()>;

    /// 同目录重命名，目标已存在则失败
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// 跨目录移动；优先原子 rename
    fn move_path(&self, from: &Path, to: &Path) -> Result<()>;

    /// 文件按字节复制，目录递归复制，符号链接按原样重建；目标已存在则失败
    fn copy_recursive(&self, from: &Path, to: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> Result<FileMetadata>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/file.rs"]
mod tests;

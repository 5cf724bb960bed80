//! 目录条目：只在一次查询内存活的快照对象

use std::path::PathBuf;
use std::time::SystemTime;

use crate::kernel::services::ports::file::DirEntry;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub tagged: bool,
}

impl FileSystemEntry {
    pub fn from_dir_entry(entry: DirEntry, tagged: bool) -> Self {
        let kind = if entry.is_dir {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Self {
            path: entry.path,
            name: entry.name,
            kind,
            size: entry.size,
            modified: entry.modified,
            tagged,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// 文件属性（名称、路径、大小、修改时间）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryProperties {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub readonly: bool,
}

/// 预览面板使用的文本片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub text: String,
    pub truncated: bool,
}

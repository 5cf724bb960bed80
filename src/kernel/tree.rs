//! 文件树模型
//!
//! 磁盘是唯一可信来源：模型只保存当前视图目录的快照，
//! 任何修改操作都会使受影响目录的快照失效，下次访问时重新读取。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::error::{EngineError, Result};
use crate::kernel::path_resolver::PathResolver;
use crate::kernel::services::ports::file::FileProvider;
use crate::models::{EntryKind, EntryProperties, FileSystemEntry, Preview, TagSet};

#[derive(Debug)]
struct Snapshot {
    dir: PathBuf,
    entries: Vec<FileSystemEntry>,
}

pub struct FileTreeModel {
    provider: Arc<dyn FileProvider>,
    resolver: PathResolver,
    current: PathBuf,
    snapshot: Option<Snapshot>,
}

impl FileTreeModel {
    pub fn new(provider: Arc<dyn FileProvider>, resolver: PathResolver) -> Self {
        let current = resolver.root().to_path_buf();
        Self {
            provider,
            resolver,
            current,
            snapshot: None,
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// 当前视图目录
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// 列出目录内容，每次都从磁盘读取
    pub fn list(&self, dir: &Path, tags: &TagSet) -> Result<Vec<FileSystemEntry>> {
        let dir = self.resolver.resolve_path(dir)?;
        let entries = self.provider.read_dir(&dir)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let tagged = tags.is_tagged(&entry.path);
                FileSystemEntry::from_dir_entry(entry, tagged)
            })
            .collect())
    }

    /// 当前视图的快照；失效后重新读取，标记状态每次按 TagSet 刷新
    pub fn entries(&mut self, tags: &TagSet) -> Result<&[FileSystemEntry]> {
        let stale = self
            .snapshot
            .as_ref()
            .map_or(true, |snapshot| snapshot.dir != self.current);
        if stale {
            let entries = self.list(&self.current, tags)?;
            self.snapshot = Some(Snapshot {
                dir: self.current.clone(),
                entries,
            });
        }

        match self.snapshot.as_mut() {
            Some(snapshot) => {
                for entry in snapshot.entries.iter_mut() {
                    entry.tagged = tags.is_tagged(&entry.path);
                }
                Ok(&snapshot.entries)
            }
            None => Ok(&[]),
        }
    }

    /// 丢弃快照并立即重新读取当前视图
    pub fn refresh(&mut self, tags: &TagSet) -> Result<&[FileSystemEntry]> {
        self.snapshot = None;
        self.entries(tags)
    }

    pub fn navigate(&mut self, dir: &Path) -> Result<PathBuf> {
        let dir = self.resolver.resolve_path(dir)?;
        if !self.provider.exists(&dir) {
            return Err(EngineError::NotFound(dir));
        }
        if !self.provider.is_dir(&dir) {
            return Err(EngineError::NotADirectory(dir));
        }
        self.current = dir.clone();
        self.snapshot = None;
        Ok(dir)
    }

    /// 父目录；根目录是不动点，无法解析的路径也回到根目录
    pub fn navigate_up(&self, current: &Path) -> PathBuf {
        let root = self.resolver.root();
        let current = match self.resolver.resolve_path(current) {
            Ok(path) => path,
            Err(_) => return root.to_path_buf(),
        };
        match current.parent() {
            Some(parent) if parent.starts_with(root) => parent.to_path_buf(),
            _ => root.to_path_buf(),
        }
    }

    /// 当前视图上移一级
    pub fn go_up(&mut self) -> PathBuf {
        let parent = self.navigate_up(&self.current);
        if parent != self.current {
            self.current = parent.clone();
            self.snapshot = None;
        }
        parent
    }

    pub fn create_folder(&mut self, parent: &Path, name: &str) -> Result<PathBuf> {
        let path = self
            .resolver
            .new_child(self.provider.as_ref(), parent, name)?;
        self.provider.create_dir(&path)?;
        tracing::debug!(path = %path.display(), "folder created");
        self.invalidate_parent_of(&path);
        Ok(path)
    }

    pub fn create_file(&mut self, parent: &Path, name: &str) -> Result<PathBuf> {
        let path = self
            .resolver
            .new_child(self.provider.as_ref(), parent, name)?;
        self.provider.create_file(&path)?;
        tracing::debug!(path = %path.display(), "file created");
        self.invalidate_parent_of(&path);
        Ok(path)
    }

    /// 删除文件或递归删除目录；被删除路径及其子路径的标记一并清除
    ///
    /// 路径已不存在时同样清除其标记，并返回 `NotFound`。
    pub fn delete(&mut self, path: &Path, tags: &mut TagSet) -> Result<()> {
        let path = self
            .resolve_existing_child(path)
            .and_then(|path| self.provider.delete(&path).map(|()| path))
            .map_err(|err| {
                if let EngineError::NotFound(missing) = &err {
                    tags.forget_subtree(missing);
                }
                err
            })?;
        let untagged = tags.forget_subtree(&path);
        tracing::debug!(path = %path.display(), untagged, "entry deleted");

        self.invalidate_parent_of(&path);
        if self.current.starts_with(&path) {
            self.current = self.navigate_up(&path);
            self.snapshot = None;
        }
        Ok(())
    }

    /// 同目录重命名
    ///
    /// 旧路径（以及目录下的子路径）的标记失效，新路径不会自动加入标记。
    pub fn rename(&mut self, path: &Path, new_name: &str, tags: &mut TagSet) -> Result<PathBuf> {
        let new_name = PathResolver::validate_name(new_name)?;
        let path = self.resolve_existing_child(path)?;
        let parent = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => return Err(EngineError::OutsideWorkspace(path)),
        };

        let new_path = parent.join(new_name);
        if new_path == path {
            return Ok(path);
        }
        let collides = self
            .provider
            .read_dir(&parent)?
            .iter()
            .any(|entry| entry.name == new_name);
        if collides {
            return Err(EngineError::AlreadyExists(new_path));
        }

        self.provider.rename(&path, &new_path)?;
        let untagged = tags.forget_subtree(&path);
        tracing::debug!(
            from = %path.display(),
            to = %new_path.display(),
            untagged,
            "entry renamed"
        );

        self.invalidate_parent_of(&path);
        self.rebase(&path, &new_path);
        Ok(new_path)
    }

    pub fn properties(&self, path: &Path) -> Result<EntryProperties> {
        let path = self.resolver.resolve_path(path)?;
        let meta = self.provider.metadata(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(EntryProperties {
            name,
            kind: if meta.is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            path,
            size: meta.size,
            modified: meta.modified,
            readonly: meta.readonly,
        })
    }

    /// 读取文件开头至多 `max_bytes` 字节用于预览，不完整的 UTF-8 尾部会被截掉
    pub fn preview(&self, path: &Path, max_bytes: usize) -> Result<Preview> {
        let path = self.resolver.resolve_path(path)?;
        if self.provider.is_dir(&path) {
            return Err(EngineError::UnreadableFile {
                path,
                reason: "is a directory".to_string(),
            });
        }
        let (mut bytes, truncated) = self.provider.read_prefix(&path, max_bytes)?;
        if truncated {
            if let Err(e) = std::str::from_utf8(&bytes) {
                if e.error_len().is_none() {
                    bytes.truncate(e.valid_up_to());
                }
            }
        }
        Ok(Preview {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            truncated,
        })
    }

    /// 递归列出子树
    pub fn walk(&self, dir: &Path, tags: &TagSet) -> Result<Vec<FileSystemEntry>> {
        let dir = self.resolver.resolve_path(dir)?;
        Ok(self
            .provider
            .walk(&dir)?
            .into_iter()
            .map(|entry| {
                let tagged = tags.is_tagged(&entry.path);
                FileSystemEntry::from_dir_entry(entry, tagged)
            })
            .collect())
    }

    /// 修改操作之后调用：受影响的目录若是当前视图则丢弃快照
    pub fn invalidate(&mut self, dir: &Path) {
        if self.snapshot.as_ref().is_some_and(|s| s.dir == dir) {
            self.snapshot = None;
        }
    }

    /// `from` 被移动到 `to` 后，位于 `from` 之下的当前视图随之迁移
    pub fn rebase(&mut self, from: &Path, to: &Path) {
        if let Ok(rest) = self.current.strip_prefix(from) {
            let moved = to.join(rest);
            tracing::debug!(from = %self.current.display(), to = %moved.display(), "view rebased");
            self.current = moved;
            self.snapshot = None;
        }
    }

    fn invalidate_parent_of(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            let parent = parent.to_path_buf();
            self.invalidate(&parent);
        }
    }

    /// 已存在且不是工作区根目录本身的路径
    fn resolve_existing_child(&self, path: &Path) -> Result<PathBuf> {
        let path = self.resolver.resolve_path(path)?;
        if self.resolver.is_root(&path) {
            return Err(EngineError::OutsideWorkspace(path));
        }
        if !self.provider.exists(&path) {
            return Err(EngineError::NotFound(path));
        }
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/tree.rs"]
mod tests;

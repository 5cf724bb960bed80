//! 剪贴板控制器
//!
//! 同一时间只有一个待定的剪切/复制条目；新的剪切/复制直接替换旧条目。
//! 粘贴不会清空剪贴板，可以重复粘贴。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::batch::{cancelled, BatchItem, CancelFlag, PasteItem};
use crate::kernel::error::{EngineError, Result};
use crate::kernel::path_resolver::PathResolver;
use crate::kernel::services::ports::file::FileProvider;
use crate::models::TagSet;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClipboardMode {
    Cut,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub mode: ClipboardMode,
    pub sources: Vec<PathBuf>,
}

pub struct ClipboardController {
    provider: Arc<dyn FileProvider>,
    resolver: PathResolver,
    entry: Option<ClipboardEntry>,
}

impl ClipboardController {
    pub fn new(provider: Arc<dyn FileProvider>, resolver: PathResolver) -> Self {
        Self {
            provider,
            resolver,
            entry: None,
        }
    }

    pub fn cut<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
        self.set(ClipboardMode::Cut, paths)
    }

    pub fn copy<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
        self.set(ClipboardMode::Copy, paths)
    }

    fn set<P: AsRef<Path>>(&mut self, mode: ClipboardMode, paths: &[P]) -> Result<usize> {
        let mut sources: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for path in paths {
            let resolved = self.resolver.resolve_path(path.as_ref())?;
            if self.resolver.is_root(&resolved) {
                return Err(EngineError::OutsideWorkspace(resolved));
            }
            if !sources.contains(&resolved) {
                sources.push(resolved);
            }
        }

        if sources.is_empty() {
            self.entry = None;
            return Ok(0);
        }
        let count = sources.len();
        self.entry = Some(ClipboardEntry { mode, sources });
        Ok(count)
    }

    pub fn peek(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// 把剪贴板内容粘贴到 `destination` 目录
    ///
    /// 目标目录不存在、不是目录、或位于某个源目录之内时，整个调用在任何文件系统
    /// 修改之前失败。其余情况逐项执行并返回每项结果，单项失败不影响其他项。
    pub fn paste(
        &mut self,
        destination: &Path,
        tags: &mut TagSet,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<PasteItem>> {
        let entry = match &self.entry {
            Some(entry) => entry.clone(),
            None => return Ok(Vec::new()),
        };

        let destination = self.resolver.resolve_path(destination)?;
        if !self.provider.exists(&destination) {
            return Err(EngineError::NotFound(destination));
        }
        if !self.provider.is_dir(&destination) {
            return Err(EngineError::InvalidParent(destination));
        }
        if entry
            .sources
            .iter()
            .any(|source| destination.starts_with(source))
        {
            return Err(EngineError::CyclicDestination(destination));
        }

        let mut items = Vec::with_capacity(entry.sources.len());
        for source in entry.sources {
            if cancelled(cancel) {
                items.push(BatchItem::cancelled(source));
                continue;
            }
            let result = self.paste_one(entry.mode, &source, &destination);
            match &result {
                Ok(target) => {
                    if entry.mode == ClipboardMode::Cut {
                        tags.forget_subtree(&source);
                    }
                    tracing::debug!(
                        source = %source.display(),
                        target = %target.display(),
                        mode = ?entry.mode,
                        "pasted"
                    );
                }
                Err(err) => {
                    tracing::debug!(source = %source.display(), error = %err, "paste item failed");
                }
            }
            items.push(BatchItem::new(source, result));
        }
        Ok(items)
    }

    fn paste_one(&self, mode: ClipboardMode, source: &Path, destination: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| EngineError::InvalidName(source.display().to_string()))?;
        let target = destination.join(name);
        if !self.provider.exists(source) {
            return Err(EngineError::NotFound(source.to_path_buf()));
        }
        if self.provider.exists(&target) {
            return Err(EngineError::AlreadyExists(target));
        }

        match mode {
            ClipboardMode::Copy => self.provider.copy_recursive(source, &target)?,
            ClipboardMode::Cut => self.provider.move_path(source, &target)?,
        }
        Ok(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/clipboard.rs"]
mod tests;

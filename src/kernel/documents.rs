//! 文档会话管理：打开的标签页（内存缓冲区）以及加载/保存
//!
//! 缓冲区 id 使用带代数的 slotmap key，关闭后旧 id 不会再命中任何缓冲区。

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::batch::{cancelled, BatchItem, CancelFlag, SaveItem};
use crate::kernel::error::{EngineError, Result};
use crate::kernel::path_resolver::PathResolver;
use crate::kernel::services::ports::file::FileProvider;
use crate::models::{BufferId, BufferState, DocumentBuffer, DocumentFormat};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SaveMode {
    /// 目标已存在时失败，除非目标就是该缓冲区自己读取/保存过的文件
    CreateNew,
    Overwrite,
}

pub struct DocumentSessionManager {
    provider: Arc<dyn FileProvider>,
    resolver: PathResolver,
    buffers: SlotMap<BufferId, DocumentBuffer>,
    // 标签页顺序
    order: Vec<BufferId>,
    default_format: DocumentFormat,
    default_mode: SaveMode,
}

impl DocumentSessionManager {
    pub fn new(provider: Arc<dyn FileProvider>, resolver: PathResolver) -> Self {
        Self {
            provider,
            resolver,
            buffers: SlotMap::with_key(),
            order: Vec::new(),
            default_format: DocumentFormat::default(),
            default_mode: SaveMode::CreateNew,
        }
    }

    pub fn with_defaults(mut self, format: DocumentFormat, overwrite: bool) -> Self {
        self.default_format = format;
        self.default_mode = if overwrite {
            SaveMode::Overwrite
        } else {
            SaveMode::CreateNew
        };
        self
    }

    /// 新建空白、未命名的文档
    pub fn new_document(&mut self) -> BufferId {
        self.new_named(String::new(), self.default_format)
    }

    pub fn new_named(&mut self, name: impl Into<String>, format: DocumentFormat) -> BufferId {
        let name = name.into();
        let id = self
            .buffers
            .insert_with_key(|id| DocumentBuffer::new_empty(id, name, format));
        self.order.push(id);
        id
    }

    /// 打开磁盘文件；名称取文件名主干，格式取扩展名（不在支持列表内时使用默认格式）
    pub fn open(&mut self, path: &Path) -> Result<BufferId> {
        let path = self.resolver.resolve_path(path)?;
        let content = self
            .provider
            .read_file(&path)
            .map_err(|err| match err {
                EngineError::UnreadableFile { .. } => err,
                other => EngineError::UnreadableFile {
                    path: path.clone(),
                    reason: other.to_string(),
                },
            })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let format = path
            .extension()
            .and_then(|ext| DocumentFormat::from_extension(&ext.to_string_lossy()))
            .unwrap_or(self.default_format);

        let id = self
            .buffers
            .insert_with_key(|id| DocumentBuffer::loaded(id, content, name, format, path.clone()));
        self.order.push(id);
        tracing::debug!(path = %path.display(), buffer = %id, "document opened");
        Ok(id)
    }

    pub fn edit(&mut self, id: BufferId, content: impl Into<String>) -> Result<()> {
        self.buffer_mut(id)?.set_content(content.into());
        Ok(())
    }

    /// 只修改内存中的目标名称，不触碰已写出的文件，也不改变保存状态
    pub fn rename(&mut self, id: BufferId, new_name: &str) -> Result<()> {
        let name = PathResolver::validate_name(new_name.trim())?;
        self.buffer_mut(id)?.set_name(name.to_string());
        Ok(())
    }

    pub fn set_format(&mut self, id: BufferId, format: DocumentFormat) -> Result<()> {
        self.buffer_mut(id)?.set_format(format);
        Ok(())
    }

    pub fn save(&mut self, id: BufferId, target_dir: &Path) -> Result<PathBuf> {
        self.save_with(id, target_dir, self.default_mode)
    }

    /// 写出 `{name}.{format}` 到 `target_dir`（不存在时创建）
    pub fn save_with(&mut self, id: BufferId, target_dir: &Path, mode: SaveMode) -> Result<PathBuf> {
        let target = self.plan_save(id, target_dir, mode)?;
        self.write(id, target)
    }

    /// 依次保存所有打开的缓冲区
    ///
    /// 同一批次中多个缓冲区指向同一最终路径时，后出现的缓冲区报告冲突，
    /// 先写入的文件保持不变。
    pub fn save_all(&mut self, target_dir: &Path, cancel: Option<&CancelFlag>) -> Vec<SaveItem> {
        let mut claimed: FxHashSet<PathBuf> = FxHashSet::default();
        let mut items = Vec::with_capacity(self.order.len());

        for id in self.order.clone() {
            if cancelled(cancel) {
                items.push(BatchItem::cancelled(id));
                continue;
            }
            let result = self
                .plan_save(id, target_dir, self.default_mode)
                .and_then(|target| {
                    if claimed.contains(&target) {
                        return Err(EngineError::AlreadyExists(target));
                    }
                    self.write(id, target)
                });
            match &result {
                Ok(path) => {
                    claimed.insert(path.clone());
                }
                Err(err) => {
                    tracing::debug!(buffer = %id, error = %err, "save failed");
                }
            }
            items.push(BatchItem::new(id, result));
        }
        items
    }

    /// 丢弃缓冲区，不做任何写入；是否确认放弃未保存修改由调用方负责
    pub fn close(&mut self, id: BufferId) -> Result<DocumentBuffer> {
        let buffer = self
            .buffers
            .remove(id)
            .ok_or(EngineError::UnknownBuffer(id))?;
        self.order.retain(|&other| other != id);
        Ok(buffer)
    }

    pub fn close_all(&mut self) -> Vec<DocumentBuffer> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.buffers.remove(id))
            .collect()
    }

    pub fn buffer(&self, id: BufferId) -> Result<&DocumentBuffer> {
        self.buffers.get(id).ok_or(EngineError::UnknownBuffer(id))
    }

    pub fn state(&self, id: BufferId) -> Result<BufferState> {
        self.buffer(id).map(DocumentBuffer::state)
    }

    pub fn is_dirty(&self, id: BufferId) -> Result<bool> {
        self.buffer(id).map(DocumentBuffer::is_dirty)
    }

    /// 按标签页顺序
    pub fn buffers(&self) -> impl Iterator<Item = &DocumentBuffer> + '_ {
        self.order.iter().filter_map(|&id| self.buffers.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn buffer_mut(&mut self, id: BufferId) -> Result<&mut DocumentBuffer> {
        self.buffers
            .get_mut(id)
            .ok_or(EngineError::UnknownBuffer(id))
    }

    /// 校验并计算目标路径，不做任何写入
    fn plan_save(&self, id: BufferId, target_dir: &Path, mode: SaveMode) -> Result<PathBuf> {
        let buffer = self.buffer(id)?;
        let file_name = buffer.file_name().ok_or(EngineError::MissingName)?;
        PathResolver::validate_name(&file_name)?;

        let dir = self.resolver.resolve_path(target_dir)?;
        if self.provider.exists(&dir) && !self.provider.is_dir(&dir) {
            return Err(EngineError::NotADirectory(dir));
        }

        let target = dir.join(file_name);
        if self.provider.is_dir(&target) {
            return Err(EngineError::AlreadyExists(target));
        }
        let own_file = buffer.origin() == Some(target.as_path());
        if mode == SaveMode::CreateNew && !own_file && self.provider.exists(&target) {
            return Err(EngineError::AlreadyExists(target));
        }
        Ok(target)
    }

    fn write(&mut self, id: BufferId, target: PathBuf) -> Result<PathBuf> {
        if let Some(dir) = target.parent() {
            if !self.provider.exists(dir) {
                self.provider.create_dir_all(dir)?;
            }
        }
        let buffer = self.buffer(id)?;
        if !buffer.format().is_plain_text() {
            tracing::debug!(
                buffer = %id,
                format = %buffer.format(),
                "writing raw text for a non plain-text format"
            );
        }
        self.provider.write_file(&target, buffer.content())?;
        self.buffer_mut(id)?.mark_saved(target.clone());
        tracing::debug!(buffer = %id, path = %target.display(), "document saved");
        Ok(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/documents.rs"]
mod tests;

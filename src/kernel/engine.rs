//! 引擎：组合文件树、标记集合、剪贴板与文档会话
//!
//! 展示层持有一个 Engine 实例并显式调用其方法；每个操作的成功与失败
//! 都会写入审计日志。多线程宿主使用 [`SharedEngine`] 整体加锁。

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::kernel::audit::AuditLog;
use crate::kernel::batch::{
    cancelled, summarize, BatchItem, CancelFlag, DeleteItem, PasteItem, SaveItem,
};
use crate::kernel::clipboard::{ClipboardController, ClipboardMode};
use crate::kernel::documents::{DocumentSessionManager, SaveMode};
use crate::kernel::error::{EngineError, Result};
use crate::kernel::path_resolver::PathResolver;
use crate::kernel::services::adapters::{default_audit_log_path, default_workspace_root};
use crate::kernel::services::adapters::LocalFileProvider;
use crate::kernel::services::ports::file::FileProvider;
use crate::kernel::services::ports::settings::Settings;
use crate::kernel::tree::FileTreeModel;
use crate::models::{
    BufferId, DocumentFormat, EntryProperties, FileSystemEntry, Preview, TagSet,
};

pub type SharedEngine = Arc<Mutex<Engine>>;

pub struct Engine {
    settings: Settings,
    resolver: PathResolver,
    tree: FileTreeModel,
    tags: TagSet,
    clipboard: ClipboardController,
    documents: DocumentSessionManager,
    audit: AuditLog,
}

impl Engine {
    /// 按配置打开引擎：创建工作区根目录并打开审计日志文件
    pub fn open(settings: Settings) -> Result<Self> {
        let root = settings
            .workspace_root
            .clone()
            .unwrap_or_else(default_workspace_root);
        let audit_path = settings
            .audit_log
            .clone()
            .unwrap_or_else(default_audit_log_path);

        let audit = match AuditLog::with_file(&audit_path) {
            Ok(audit) => audit,
            Err(e) => {
                tracing::warn!(
                    path = %audit_path.display(),
                    error = %e,
                    "audit log file unavailable, keeping records in memory"
                );
                AuditLog::in_memory()
            }
        };

        Self::with_parts(Arc::new(LocalFileProvider::new()), root, audit, settings)
    }

    /// 以 `root` 为工作区、使用默认配置与内存审计日志
    pub fn with_root(root: impl AsRef<Path>) -> Result<Self> {
        let settings = Settings {
            workspace_root: Some(root.as_ref().to_path_buf()),
            ..Settings::default()
        };
        Self::with_parts(
            Arc::new(LocalFileProvider::new()),
            root.as_ref().to_path_buf(),
            AuditLog::in_memory(),
            settings,
        )
    }

    pub fn with_parts(
        provider: Arc<dyn FileProvider>,
        root: PathBuf,
        audit: AuditLog,
        settings: Settings,
    ) -> Result<Self> {
        if !provider.exists(&root) {
            provider.create_dir_all(&root)?;
        } else if !provider.is_dir(&root) {
            return Err(EngineError::NotADirectory(root));
        }

        let resolver = PathResolver::new(&root);
        let tree = FileTreeModel::new(provider.clone(), resolver.clone());
        let clipboard = ClipboardController::new(provider.clone(), resolver.clone());
        let documents = DocumentSessionManager::new(provider, resolver.clone())
            .with_defaults(settings.default_format, settings.overwrite_existing);

        tracing::info!(root = %resolver.root().display(), "workspace engine ready");

        Ok(Self {
            settings,
            resolver,
            tree,
            tags: TagSet::new(),
            clipboard,
            documents,
            audit,
        })
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tree(&self) -> &FileTreeModel {
        &self.tree
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn clipboard(&self) -> &ClipboardController {
        &self.clipboard
    }

    pub fn documents(&self) -> &DocumentSessionManager {
        &self.documents
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// 把单个操作的结果写入审计日志
    fn audited<T>(
        &mut self,
        result: Result<T>,
        success: impl FnOnce(&T) -> String,
        failure: impl Display,
    ) -> Result<T> {
        match &result {
            Ok(value) => self.audit.info(success(value)),
            Err(err) => self.audit.error(format!("{}: {}", failure, err)),
        }
        result
    }

    fn audit_batch<K, T>(
        &mut self,
        label: &str,
        items: &[BatchItem<K, T>],
        describe: impl Fn(&K) -> String,
    ) {
        for item in items {
            if let Err(err) = &item.result {
                self.audit
                    .error(format!("{} {}: {}", label, describe(&item.item), err));
            }
        }
        let (ok, failed) = summarize(items);
        self.audit
            .info(format!("{}: {} succeeded, {} failed", label, ok, failed));
    }

    // ---- 文件树 ----

    pub fn list(&mut self, dir: &Path) -> Result<Vec<FileSystemEntry>> {
        let result = self.tree.list(dir, &self.tags);
        self.audit_failure(result, format!("List {}", dir.display()))
    }

    /// 只记录失败的只读查询
    fn audit_failure<T>(&mut self, result: Result<T>, what: impl Display) -> Result<T> {
        if let Err(err) = &result {
            self.audit.error(format!("{}: {}", what, err));
        }
        result
    }

    /// 当前视图目录的快照
    pub fn entries(&mut self) -> Result<Vec<FileSystemEntry>> {
        let result = self.tree.entries(&self.tags).map(|entries| entries.to_vec());
        let current = self.tree.current().display().to_string();
        self.audit_failure(result, format!("List {}", current))
    }

    pub fn refresh(&mut self) -> Result<Vec<FileSystemEntry>> {
        let result = self.tree.refresh(&self.tags).map(|entries| entries.to_vec());
        let current = self.tree.current().display().to_string();
        self.audit_failure(result, format!("Refresh {}", current))
    }

    pub fn current_dir(&self) -> &Path {
        self.tree.current()
    }

    pub fn navigate(&mut self, dir: &Path) -> Result<PathBuf> {
        let result = self.tree.navigate(dir);
        self.audit_failure(result, format!("Navigate to {}", dir.display()))
    }

    pub fn navigate_up(&mut self) -> PathBuf {
        self.tree.go_up()
    }

    pub fn create_folder(&mut self, parent: &Path, name: &str) -> Result<PathBuf> {
        let result = self.tree.create_folder(parent, name);
        let root = self.resolver.clone();
        self.audited(
            result,
            |path| format!("Created folder {}", root.relative(path).display()),
            format!("Create folder {:?} in {}", name, parent.display()),
        )
    }

    pub fn create_file(&mut self, parent: &Path, name: &str) -> Result<PathBuf> {
        let result = self.tree.create_file(parent, name);
        let root = self.resolver.clone();
        self.audited(
            result,
            |path| format!("Created file {}", root.relative(path).display()),
            format!("Create file {:?} in {}", name, parent.display()),
        )
    }

    pub fn delete(&mut self, path: &Path) -> Result<()> {
        let result = self.tree.delete(path, &mut self.tags);
        let shown = path.display().to_string();
        self.audited(
            result,
            |_| format!("Deleted {}", shown),
            format!("Delete {}", shown),
        )
    }

    pub fn rename(&mut self, path: &Path, new_name: &str) -> Result<PathBuf> {
        let result = self.tree.rename(path, new_name, &mut self.tags);
        let shown = path.display().to_string();
        let root = self.resolver.clone();
        self.audited(
            result,
            |new_path| format!("Renamed {} to {}", shown, root.relative(new_path).display()),
            format!("Rename {} to {:?}", shown, new_name),
        )
    }

    pub fn properties(&mut self, path: &Path) -> Result<EntryProperties> {
        let result = self.tree.properties(path);
        self.audit_failure(result, format!("Properties of {}", path.display()))
    }

    pub fn preview(&mut self, path: &Path) -> Result<Preview> {
        let result = self.tree.preview(path, self.settings.preview_bytes);
        self.audit_failure(result, format!("Preview {}", path.display()))
    }

    pub fn walk(&mut self, dir: &Path) -> Result<Vec<FileSystemEntry>> {
        let result = self.tree.walk(dir, &self.tags);
        self.audit_failure(result, format!("Walk {}", dir.display()))
    }

    // ---- 标记 ----

    pub fn tag(&mut self, path: &Path) -> Result<()> {
        let result = self.resolver.resolve_path(path).map(|resolved| {
            self.tags.tag(resolved);
        });
        let shown = path.display().to_string();
        self.audited(
            result,
            |_| format!("Tagged {}", shown),
            format!("Tag {}", shown),
        )
    }

    pub fn untag(&mut self, path: &Path) -> Result<()> {
        let result = self.resolver.resolve_path(path).map(|resolved| {
            self.tags.untag(&resolved);
        });
        let shown = path.display().to_string();
        self.audited(
            result,
            |_| format!("Untagged {}", shown),
            format!("Untag {}", shown),
        )
    }

    pub fn toggle_tag(&mut self, path: &Path) -> Result<bool> {
        let result = self
            .resolver
            .resolve_path(path)
            .map(|resolved| self.tags.toggle(resolved));
        let shown = path.display().to_string();
        self.audited(
            result,
            |&now_tagged| {
                if now_tagged {
                    format!("Tagged {}", shown)
                } else {
                    format!("Untagged {}", shown)
                }
            },
            format!("Toggle tag {}", shown),
        )
    }

    /// 无法解析的路径视为未标记
    pub fn is_tagged(&self, path: &Path) -> bool {
        self.resolver
            .resolve_path(path)
            .map(|path| self.tags.is_tagged(&path))
            .unwrap_or(false)
    }

    pub fn untag_all(&mut self) {
        let count = self.tags.len();
        self.tags.untag_all();
        self.audit.info(format!("Cleared {} tag(s)", count));
    }

    pub fn tagged(&self) -> Vec<PathBuf> {
        self.tags.tagged()
    }

    /// 逐项删除所有已标记路径
    ///
    /// 返回的结果数等于标记数；祖先目录已在本批次中删除的子路径视为成功。
    pub fn delete_tagged(&mut self, cancel: Option<&CancelFlag>) -> Vec<DeleteItem> {
        let targets = self.tags.tagged();
        let mut removed: Vec<PathBuf> = Vec::new();
        let mut items = Vec::with_capacity(targets.len());

        for path in targets {
            if cancelled(cancel) {
                items.push(BatchItem::cancelled(path));
                continue;
            }
            if removed.iter().any(|dir| path.starts_with(dir)) {
                self.tags.untag(&path);
                items.push(BatchItem::new(path, Ok(())));
                continue;
            }
            let result = self.tree.delete(&path, &mut self.tags);
            if result.is_ok() {
                removed.push(path.clone());
            }
            items.push(BatchItem::new(path, result));
        }

        let root = self.resolver.clone();
        self.audit_batch("Delete tagged", &items, |p| {
            root.relative(p).display().to_string()
        });
        items
    }

    // ---- 剪贴板 ----

    pub fn cut<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
        let result = self.clipboard.cut(paths);
        self.audited(
            result,
            |n| format!("Cut {} item(s)", n),
            "Cut",
        )
    }

    pub fn copy<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
        let result = self.clipboard.copy(paths);
        self.audited(
            result,
            |n| format!("Copied {} item(s)", n),
            "Copy",
        )
    }

    /// 以当前标记集合作为剪贴板来源
    pub fn cut_tagged(&mut self) -> Result<usize> {
        let tagged = self.tags.tagged();
        self.cut(&tagged)
    }

    pub fn copy_tagged(&mut self) -> Result<usize> {
        let tagged = self.tags.tagged();
        self.copy(&tagged)
    }

    pub fn paste(
        &mut self,
        destination: &Path,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<PasteItem>> {
        let mode = self.clipboard.peek().map(|entry| entry.mode);
        let result = self.clipboard.paste(destination, &mut self.tags, cancel);

        let items = match result {
            Ok(items) => items,
            Err(err) => {
                self.audit
                    .error(format!("Paste into {}: {}", destination.display(), err));
                return Err(err);
            }
        };

        // 目标目录与被移动项目的原父目录都可能是当前视图
        if let Ok(dest) = self.resolver.resolve_path(destination) {
            self.tree.invalidate(&dest);
        }
        if mode == Some(ClipboardMode::Cut) {
            for item in &items {
                let Ok(target) = &item.result else {
                    continue;
                };
                if let Some(parent) = item.item.parent() {
                    let parent = parent.to_path_buf();
                    self.tree.invalidate(&parent);
                }
                self.tree.rebase(&item.item, target);
            }
        }

        let label = match mode {
            Some(ClipboardMode::Cut) => "Move",
            _ => "Paste",
        };
        let root = self.resolver.clone();
        self.audit_batch(label, &items, |p| root.relative(p).display().to_string());
        Ok(items)
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard.clear();
    }

    // ---- 文档 ----

    pub fn new_document(&mut self) -> BufferId {
        let id = self.documents.new_document();
        self.audit.info(format!("New document {}", id));
        id
    }

    pub fn new_named_document(&mut self, name: &str, format: DocumentFormat) -> BufferId {
        let id = self.documents.new_named(name, format);
        self.audit
            .info(format!("New document {} ({}.{})", id, name, format));
        id
    }

    pub fn open_document(&mut self, path: &Path) -> Result<BufferId> {
        let result = self.documents.open(path);
        let shown = path.display().to_string();
        self.audited(
            result,
            |id| format!("Opened {} as {}", shown, id),
            format!("Open {}", shown),
        )
    }

    pub fn edit_document(&mut self, id: BufferId, content: impl Into<String>) -> Result<()> {
        let result = self.documents.edit(id, content);
        if let Err(err) = &result {
            self.audit.error(format!("Edit {}: {}", id, err));
        }
        result
    }

    pub fn rename_document(&mut self, id: BufferId, new_name: &str) -> Result<()> {
        let result = self.documents.rename(id, new_name);
        self.audited(
            result,
            |_| format!("Renamed document {} to {:?}", id, new_name),
            format!("Rename document {}", id),
        )
    }

    pub fn set_document_format(&mut self, id: BufferId, format: DocumentFormat) -> Result<()> {
        let result = self.documents.set_format(id, format);
        self.audited(
            result,
            |_| format!("Document {} format set to {}", id, format),
            format!("Set format of {}", id),
        )
    }

    pub fn save_document(&mut self, id: BufferId, target_dir: &Path) -> Result<PathBuf> {
        let result = self.documents.save(id, target_dir);
        self.after_save(id, result)
    }

    pub fn save_document_as(
        &mut self,
        id: BufferId,
        target_dir: &Path,
        mode: SaveMode,
    ) -> Result<PathBuf> {
        let result = self.documents.save_with(id, target_dir, mode);
        self.after_save(id, result)
    }

    fn after_save(&mut self, id: BufferId, result: Result<PathBuf>) -> Result<PathBuf> {
        if let Ok(path) = &result {
            if let Some(parent) = path.parent() {
                let parent = parent.to_path_buf();
                self.tree.invalidate(&parent);
            }
        }
        let root = self.resolver.clone();
        self.audited(
            result,
            |path| format!("Saved {} to {}", id, root.relative(path).display()),
            format!("Save {}", id),
        )
    }

    pub fn save_all(&mut self, target_dir: &Path, cancel: Option<&CancelFlag>) -> Vec<SaveItem> {
        let items = self.documents.save_all(target_dir, cancel);
        if let Ok(dir) = self.resolver.resolve_path(target_dir) {
            self.tree.invalidate(&dir);
        }
        self.audit_batch("Save all", &items, |id| id.to_string());
        items
    }

    /// 关闭标签页，不写入任何内容
    pub fn close_document(&mut self, id: BufferId) -> Result<()> {
        let result = self.documents.close(id);
        let result = result.map(|buffer| {
            if buffer.is_dirty() {
                tracing::debug!(buffer = %id, "discarded unsaved changes");
            }
        });
        self.audited(
            result,
            |_| format!("Closed document {}", id),
            format!("Close document {}", id),
        )
    }

    /// 关闭全部标签页，返回其中未保存的数量
    pub fn close_all_documents(&mut self) -> usize {
        let closed = self.documents.close_all();
        let unsaved = closed.iter().filter(|b| b.is_dirty()).count();
        self.audit.info(format!(
            "Closed {} document(s), {} unsaved",
            closed.len(),
            unsaved
        ));
        unsaved
    }

    pub fn document_content(&self, id: BufferId) -> Result<&str> {
        self.documents.buffer(id).map(|b| b.content())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/engine.rs"]
mod tests;

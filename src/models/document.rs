//! 文档缓冲区模型

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key};
use std::fmt;
use std::path::{Path, PathBuf};

new_key_type! { pub struct BufferId; }

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.data().as_ffi())
    }
}

/// 保存时可选的目标格式
///
/// 只有 txt/md/html 能以纯文本往返；doc/pdf 仅记录用户意图，
/// 写出的仍是原始文本内容，不做任何格式转换。
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Doc,
    #[default]
    Txt,
    Md,
    Pdf,
    Html,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 5] = [
        DocumentFormat::Doc,
        DocumentFormat::Txt,
        DocumentFormat::Md,
        DocumentFormat::Pdf,
        DocumentFormat::Html,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Doc => "doc",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Md => "md",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Html => "html",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    pub fn is_plain_text(self) -> bool {
        matches!(
            self,
            DocumentFormat::Txt | DocumentFormat::Md | DocumentFormat::Html
        )
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// New → Editing ⇄ Saved；Closed 由管理器移除缓冲区表示
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferState {
    New,
    Editing,
    Saved,
}

#[derive(Debug, Clone)]
pub struct DocumentBuffer {
    id: BufferId,
    content: String,
    name: String,
    format: DocumentFormat,
    state: BufferState,
    dirty: bool,
    // 最近一次读取或写入的磁盘路径，允许对其覆盖保存
    origin: Option<PathBuf>,
}

impl DocumentBuffer {
    pub(crate) fn new_empty(id: BufferId, name: String, format: DocumentFormat) -> Self {
        Self {
            id,
            content: String::new(),
            name,
            format,
            state: BufferState::New,
            dirty: false,
            origin: None,
        }
    }

    pub(crate) fn loaded(
        id: BufferId,
        content: String,
        name: String,
        format: DocumentFormat,
        origin: PathBuf,
    ) -> Self {
        Self {
            id,
            content,
            name,
            format,
            state: BufferState::Saved,
            dirty: false,
            origin: Some(origin),
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// `{name}.{format}`，名称为空时返回 None
    pub fn file_name(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(format!("{}.{}", name, self.format.extension()))
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
        self.dirty = true;
        self.state = BufferState::Editing;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_format(&mut self, format: DocumentFormat) {
        self.format = format;
    }

    pub(crate) fn mark_saved(&mut self, path: PathBuf) {
        self.dirty = false;
        self.state = BufferState::Saved;
        self.origin = Some(path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/document.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::DocumentFormat;

pub const DEFAULT_PREVIEW_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// 工作区根目录，缺省为应用数据目录下的 `docs/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,
    /// 审计日志文件，缺省为日志目录下的 `audit.log`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
    #[serde(default)]
    pub default_format: DocumentFormat,
    /// 保存时允许覆盖已存在的同名文件
    #[serde(default)]
    pub overwrite_existing: bool,
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: usize,
}

fn default_preview_bytes() -> usize {
    DEFAULT_PREVIEW_BYTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace_root: None,
            audit_log: None,
            default_format: DocumentFormat::default(),
            overwrite_existing: false,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;

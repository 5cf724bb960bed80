//! 审计日志：只追加的操作记录
//!
//! 每行一条：`<ISO-8601 时间戳> - <INFO|ERROR> - <消息>`。
//! 文件以追加方式打开，引擎从不截断或轮转它。

use chrono::{DateTime, Local, SecondsFormat};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

impl AuditRecord {
    pub fn to_line(&self) -> String {
        format!(
            "{} - {} - {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
            self.severity,
            // 保证一条记录只占一行
            self.message.replace(['\r', '\n'], " ")
        )
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

#[derive(Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    sink: Option<(PathBuf, File)>,
}

impl AuditLog {
    /// 仅内存记录
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 同时追加写入 `path`，父目录不存在时创建
    pub fn with_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            records: Vec::new(),
            sink: Some((path.to_path_buf(), file)),
        })
    }

    pub fn sink_path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.append(Severity::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.append(Severity::Error, message.into());
    }

    pub fn append(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Info => tracing::info!(target: "docman::audit", "{}", message),
            Severity::Error => tracing::error!(target: "docman::audit", "{}", message),
        }

        let record = AuditRecord {
            timestamp: Local::now(),
            severity,
            message,
        };

        if let Some((path, file)) = self.sink.as_mut() {
            let line = format!("{}\n", record.to_line());
            if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
                // 写文件失败不影响内存记录
                tracing::warn!(path = %path.display(), error = %e, "audit sink write failed");
            }
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn errors(&self) -> impl Iterator<Item = &AuditRecord> + '_ {
        self.records
            .iter()
            .filter(|r| r.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/audit.rs"]
mod tests;

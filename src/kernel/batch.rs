//! 批量操作的逐项结果与取消标志
//!
//! 批量操作逐项顺序执行，单项失败不会中断其余项目。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::kernel::error::{EngineError, Result};

/// 由展示层持有的"停止批处理"开关，只在两个项目之间生效
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) fn cancelled(flag: Option<&CancelFlag>) -> bool {
    flag.is_some_and(CancelFlag::is_cancelled)
}

#[derive(Debug)]
pub struct BatchItem<K, T> {
    pub item: K,
    pub result: Result<T>,
}

impl<K, T> BatchItem<K, T> {
    pub fn new(item: K, result: Result<T>) -> Self {
        Self { item, result }
    }

    pub fn cancelled(item: K) -> Self {
        Self {
            item,
            result: Err(EngineError::Cancelled),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.result.as_ref().err()
    }
}

/// (sourcePath, resultPath | error)
pub type PasteItem = BatchItem<std::path::PathBuf, std::path::PathBuf>;
/// (bufferId, filePath | error)
pub type SaveItem = BatchItem<crate::models::BufferId, std::path::PathBuf>;
/// (taggedPath, () | error)
pub type DeleteItem = BatchItem<std::path::PathBuf, ()>;

/// 统计批量结果中的成功与失败数
pub fn summarize<K, T>(items: &[BatchItem<K, T>]) -> (usize, usize) {
    let ok = items.iter().filter(|i| i.is_ok()).count();
    (ok, items.len() - ok)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/batch.rs"]
mod tests;

//! 标记集合
//!
//! 与当前浏览的目录无关：祖先目录不在视图中时路径仍可保持标记。

use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct TagSet {
    paths: FxHashSet<PathBuf>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, path: impl Into<PathBuf>) {
        self.paths.insert(path.into());
    }

    pub fn untag(&mut self, path: &Path) {
        self.paths.remove(path);
    }

    /// 翻转标记状态，返回新状态
    pub fn toggle(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.paths.remove(&path) {
            false
        } else {
            self.paths.insert(path);
            true
        }
    }

    pub fn is_tagged(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn untag_all(&mut self) {
        self.paths.clear();
    }

    /// 按路径排序的标记列表
    pub fn tagged(&self) -> Vec<PathBuf> {
        let mut list: Vec<PathBuf> = self.paths.iter().cloned().collect();
        list.sort();
        list
    }

    /// Drops `path` and every tagged path below it. Returns how many were removed.
    pub fn forget_subtree(&mut self, path: &Path) -> usize {
        let before = self.paths.len();
        self.paths.retain(|p| !p.starts_with(path));
        before - self.paths.len()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/tag_set.rs"]
mod tests;

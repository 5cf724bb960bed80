//! 路径解析：把相对/绝对路径规范化到工作区根目录之下
//!
//! 只做词法规范化（`.`、`..`），不跟随符号链接。

use std::path::{Component, Path, PathBuf};

use crate::kernel::error::{EngineError, Result};
use crate::kernel::services::ports::file::FileProvider;

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    // 根目录的 canonical 形式（例如 macOS 上 /var -> /private/var）
    canonical_root: Option<PathBuf>,
}

impl PathResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = absolutize(root.as_ref());
        let canonical_root = std::fs::canonicalize(&root)
            .ok()
            .filter(|canonical| canonical != &root);
        Self {
            root,
            canonical_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// 解析 `target`；相对路径以 `base` 为基准，`base` 本身相对时以根目录为基准
    pub fn resolve(&self, base: &Path, target: &Path) -> Result<PathBuf> {
        if target.as_os_str().is_empty() || target.to_string_lossy().trim().is_empty() {
            return Err(EngineError::MissingName);
        }

        let joined = if target.is_absolute() {
            target.to_path_buf()
        } else if base.is_absolute() {
            base.join(target)
        } else {
            self.root.join(base).join(target)
        };

        let normalized = normalize(&joined);
        if normalized.starts_with(&self.root) {
            return Ok(normalized);
        }
        if let Some(canonical) = &self.canonical_root {
            if let Ok(rest) = normalized.strip_prefix(canonical) {
                return Ok(self.root.join(rest));
            }
        }
        Err(EngineError::OutsideWorkspace(normalized))
    }

    /// 相对根目录解析
    pub fn resolve_path(&self, target: &Path) -> Result<PathBuf> {
        if target.as_os_str().is_empty() {
            return Ok(self.root.clone());
        }
        self.resolve(&self.root, target)
    }

    /// 校验单个条目名：非空、不含分隔符、不是 `.`/`..`
    pub fn validate_name(name: &str) -> Result<&str> {
        if name.trim().is_empty() {
            return Err(EngineError::MissingName);
        }
        if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        Ok(name)
    }

    /// Resolves the path of a new entry `name` under `parent`.
    ///
    /// Fails with `InvalidParent` when `parent` is not a directory and with
    /// `AlreadyExists` when a sibling has exactly the same (case-sensitive) name.
    pub fn new_child(
        &self,
        provider: &dyn FileProvider,
        parent: &Path,
        name: &str,
    ) -> Result<PathBuf> {
        let name = Self::validate_name(name)?;
        let parent = self.resolve_path(parent)?;
        if !provider.is_dir(&parent) {
            return Err(EngineError::InvalidParent(parent));
        }
        let collides = provider
            .read_dir(&parent)?
            .iter()
            .any(|entry| entry.name == name);
        let child = parent.join(name);
        if collides {
            return Err(EngineError::AlreadyExists(child));
        }
        Ok(child)
    }

    /// 相对根目录的显示路径
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

/// 词法规范化：去掉 `.`，`..` 回退一级（不会越过文件系统根）
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let dangling = matches!(out.components().next_back(), Some(Component::ParentDir));
                if dangling || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/path_resolver.rs"]
mod tests;

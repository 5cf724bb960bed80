//! 本地文件系统 Provider
//!
//! 实现 FileProvider trait，操作本地文件系统

use crate::kernel::error::{EngineError, Result};
use crate::kernel::services::ports::file::{DirEntry, FileMetadata, FileProvider};
use ignore::WalkBuilder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

pub struct LocalFileProvider;

impl LocalFileProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn walk_error(path: &Path, err: ignore::Error) -> EngineError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(io_err) => EngineError::from_io(path, io_err),
        None => EngineError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, message),
        },
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::EXDEV)
    }

    #[cfg(windows)]
    {
        // ERROR_NOT_SAME_DEVICE
        err.raw_os_error() == Some(17)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = err;
        false
    }
}

fn ensure_absent(path: &Path) -> Result<()> {
    if fs::symlink_metadata(path).is_ok() {
        return Err(EngineError::AlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

fn ensure_present(path: &Path) -> Result<fs::Metadata> {
    fs::symlink_metadata(path).map_err(|e| EngineError::from_io(path, e))
}

/// 按原样重建符号链接，不跟随其目标
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from).map_err(|e| EngineError::from_io(from, e))?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, to).map_err(|e| EngineError::from_io(to, e))
    }

    #[cfg(windows)]
    {
        let is_dir = fs::metadata(from).map(|m| m.is_dir()).unwrap_or(false);
        let result = if is_dir {
            std::os::windows::fs::symlink_dir(&target, to)
        } else {
            std::os::windows::fs::symlink_file(&target, to)
        };
        result.map_err(|e| EngineError::from_io(to, e))
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        Err(EngineError::Io {
            path: from.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported"),
        })
    }
}

fn remove_any(path: &Path) -> Result<()> {
    let meta = ensure_present(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| EngineError::from_io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| EngineError::from_io(path, e))
    }
}

impl LocalFileProvider {
    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        fs::create_dir(to).map_err(|e| EngineError::from_io(to, e))?;

        let walker = WalkBuilder::new(from)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(from, e))?;
            if entry.depth() == 0 {
                continue;
            }
            let rel = match entry.path().strip_prefix(from) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let target = to.join(rel);
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if entry.path_is_symlink() {
                copy_link(entry.path(), &target)?;
            } else if is_dir {
                fs::create_dir(&target).map_err(|e| EngineError::from_io(&target, e))?;
            } else {
                fs::copy(entry.path(), &target)
                    .map_err(|e| EngineError::from_io(entry.path(), e))?;
            }
        }
        Ok(())
    }
}

impl FileProvider for LocalFileProvider {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let meta = fs::metadata(path).map_err(|e| EngineError::from_io(path, e))?;
        if !meta.is_dir() {
            return Err(EngineError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| EngineError::from_io(path, e))? {
            let entry = entry.map_err(|e| EngineError::from_io(path, e))?;
            let entry_path = entry.path();
            // 条目在列举期间被删除时跳过
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(EngineError::from_io(&entry_path, e)),
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry_path,
                is_dir: metadata.is_dir(),
                is_file: metadata.is_file(),
                is_symlink: metadata.is_symlink(),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }

        entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(entries)
    }

    fn walk(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let meta = fs::metadata(path).map_err(|e| EngineError::from_io(path, e))?;
        if !meta.is_dir() {
            return Err(EngineError::NotADirectory(path.to_path_buf()));
        }

        let walker = WalkBuilder::new(path)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| {
                a.to_string_lossy()
                    .to_lowercase()
                    .cmp(&b.to_string_lossy().to_lowercase())
                    .then_with(|| a.cmp(b))
            })
            .build();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(path, e))?;
            if entry.depth() == 0 {
                continue;
            }
            let metadata = entry.metadata().map_err(|e| walk_error(entry.path(), e))?;
            let mut dir_entry = DirEntry::new(entry.path().to_path_buf(), metadata.is_dir());
            dir_entry.is_symlink = entry.path_is_symlink();
            dir_entry.size = metadata.len();
            dir_entry.modified = metadata.modified().ok();
            entries.push(dir_entry);
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| EngineError::from_io(path, e))?;
        String::from_utf8(bytes).map_err(|e| EngineError::UnreadableFile {
            path: path.to_path_buf(),
            reason: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
        })
    }

    fn read_prefix(&self, path: &Path, max: usize) -> Result<(Vec<u8>, bool)> {
        let file = File::open(path).map_err(|e| EngineError::from_io(path, e))?;
        let mut bytes = Vec::with_capacity(max.min(64 * 1024));
        file.take((max as u64).saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| EngineError::from_io(path, e))?;
        let truncated = bytes.len() > max;
        bytes.truncate(max);
        Ok((bytes, truncated))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| EngineError::from_io(parent, e))?;
            }
        }
        fs::write(path, content).map_err(|e| EngineError::from_io(path, e))
    }

    fn create_file(&self, path: &Path) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| EngineError::from_io(path, e))
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path).map_err(|e| EngineError::from_io(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| EngineError::from_io(path, e))
    }

    fn delete(&self, path: &Path) -> Result<()> {
        remove_any(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_present(from)?;
        ensure_absent(to)?;
        fs::rename(from, to).map_err(|e| EngineError::from_io(from, e))
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_present(from)?;
        ensure_absent(to)?;
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "cross-device move, falling back to copy"
                );
                self.copy_recursive(from, to)?;
                remove_any(from)
            }
            Err(e) => Err(EngineError::from_io(from, e)),
        }
    }

    fn copy_recursive(&self, from: &Path, to: &Path) -> Result<()> {
        let meta = ensure_present(from)?;
        ensure_absent(to)?;

        let result = if meta.file_type().is_symlink() {
            copy_link(from, to)
        } else if meta.is_dir() {
            self.copy_tree(from, to)
        } else {
            fs::copy(from, to)
                .map(|_| ())
                .map_err(|e| EngineError::from_io(from, e))
        };

        if let Err(err) = result {
            // 目标在调用前不存在，失败时清除半成品
            if fs::symlink_metadata(to).is_ok() {
                if let Err(cleanup) = remove_any(to) {
                    tracing::warn!(path = %to.display(), error = %cleanup, "cleanup after failed copy");
                }
            }
            return Err(err);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta = fs::metadata(path).map_err(|e| EngineError::from_io(path, e))?;
        Ok(FileMetadata::from_std(meta))
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;

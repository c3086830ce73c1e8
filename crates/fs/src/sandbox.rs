// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sandboxed filesystem root. `Sandbox::resolve` is the single choke
//! point every other operation in this crate routes through.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::SandboxError;

/// One absolute root directory. Constructed once at startup; immutable
/// thereafter.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

/// Metadata returned by `stat`.
#[derive(Debug, Clone, Serialize)]
pub struct Stat {
    pub is_dir: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub len: u64,
    pub modified_unix: Option<i64>,
}

/// One entry returned by `list`.
#[derive(Debug, Clone, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl Sandbox {
    /// `root` must already exist; it is canonicalised once here.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a sandbox-relative path to an absolute path guaranteed to
    /// be inside the root. Rejects absolute inputs, NUL bytes, and any
    /// lexically-cleaned path that unwinds past the root via `..`. The
    /// empty string resolves to the root itself.
    pub fn resolve(&self, rel: &str) -> Result<PathBuf, SandboxError> {
        if rel.contains('\0') {
            return Err(SandboxError::NulByte);
        }
        let rel_path = Path::new(rel);
        if rel_path.is_absolute() {
            return Err(SandboxError::AbsolutePath(rel.to_string()));
        }

        let mut stack: Vec<Component> = Vec::new();
        for comp in rel_path.components() {
            match comp {
                Component::CurDir => {}
                Component::ParentDir => {
                    if stack.pop().is_none() {
                        return Err(SandboxError::Escapes(rel.to_string()));
                    }
                }
                Component::Normal(_) => stack.push(comp),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(SandboxError::AbsolutePath(rel.to_string()));
                }
            }
        }

        let mut resolved = self.root.clone();
        for comp in stack {
            resolved.push(comp.as_os_str());
        }
        Ok(resolved)
    }

    /// Like `resolve`, but refuses the root itself — for operations such
    /// as delete/mkdir/move that must target something beneath it.
    pub fn resolve_non_root(&self, rel: &str) -> Result<PathBuf, SandboxError> {
        let resolved = self.resolve(rel)?;
        if resolved == self.root {
            return Err(SandboxError::IsRoot);
        }
        Ok(resolved)
    }

    pub async fn read(&self, rel: &str) -> Result<Vec<u8>, SandboxError> {
        let path = self.resolve(rel)?;
        Ok(tokio::fs::read(path).await?)
    }

    pub async fn write(&self, rel: &str, data: &[u8]) -> Result<(), SandboxError> {
        let path = self.resolve_non_root(rel)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    pub async fn list(&self, rel: &str) -> Result<Vec<DirEntry>, SandboxError> {
        let path = self.resolve(rel)?;
        let mut read_dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let file_type = entry.file_type().await?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
                is_symlink: file_type.is_symlink(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub async fn stat(&self, rel: &str) -> Result<Stat, SandboxError> {
        let path = self.resolve(rel)?;
        let meta = tokio::fs::symlink_metadata(&path).await?;
        let is_symlink = meta.file_type().is_symlink();
        let meta = if is_symlink {
            meta
        } else {
            tokio::fs::metadata(&path).await?
        };
        let modified_unix = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);
        Ok(Stat {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            is_symlink,
            len: meta.len(),
            modified_unix,
        })
    }

    pub async fn mkdir(&self, rel: &str) -> Result<(), SandboxError> {
        let path = self.resolve_non_root(rel)?;
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    /// Refuses if the destination already exists.
    pub async fn move_path(&self, from_rel: &str, to_rel: &str) -> Result<(), SandboxError> {
        let from = self.resolve_non_root(from_rel)?;
        let to = self.resolve_non_root(to_rel)?;
        if tokio::fs::try_exists(&to).await? {
            return Err(SandboxError::DestinationExists(to_rel.to_string()));
        }
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(from, to).await?;
        Ok(())
    }

    /// Recursive copy. Refuses if the destination already exists, mirroring
    /// `move_path`'s refusal.
    pub async fn copy_path(&self, from_rel: &str, to_rel: &str) -> Result<(), SandboxError> {
        let from = self.resolve_non_root(from_rel)?;
        let to = self.resolve_non_root(to_rel)?;
        if tokio::fs::try_exists(&to).await? {
            return Err(SandboxError::DestinationExists(to_rel.to_string()));
        }
        copy_recursive(&from, &to).await
    }

    /// Recursive delete. Symlinks encountered along the way are removed
    /// as leaves, never followed.
    pub async fn delete(&self, rel: &str) -> Result<(), SandboxError> {
        let path = self.resolve_non_root(rel)?;
        let meta = tokio::fs::symlink_metadata(&path).await?;
        if meta.file_type().is_symlink() || meta.is_file() {
            tokio::fs::remove_file(path).await?;
        } else {
            tokio::fs::remove_dir_all(path).await?;
        }
        Ok(())
    }
}

fn copy_recursive<'a>(
    from: &'a Path,
    to: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), SandboxError>> + Send + 'a>> {
    Box::pin(async move {
        let meta = tokio::fs::symlink_metadata(from).await?;
        if meta.file_type().is_symlink() {
            let target = tokio::fs::read_link(from).await?;
            #[cfg(unix)]
            {
                use tokio::fs::os::unix::symlink;
                symlink(target, to).await?;
            }
            #[cfg(not(unix))]
            let _ = target;
            return Ok(());
        }
        if meta.is_dir() {
            tokio::fs::create_dir_all(to).await?;
            let mut read_dir = tokio::fs::read_dir(from).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                let child_to = to.join(entry.file_name());
                copy_recursive(&entry.path(), &child_to).await?;
            }
        } else {
            if let Some(parent) = to.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(from, to).await?;
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fs_zip` / `fs_unzip`. Synchronous (the `zip` crate has no async API);
//! callers run these on a blocking task.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::SandboxError;

/// Zips every file under `src_dir` (recursively) into a new archive at
/// `dest_zip`. `dest_zip` must not already exist.
pub fn zip_dir(src_dir: &Path, dest_zip: &Path) -> Result<(), SandboxError> {
    let file = File::options()
        .write(true)
        .create_new(true)
        .open(dest_zip)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for entry in walkdir::WalkDir::new(src_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_symlink() {
            continue;
        }
        let rel = entry.path().strip_prefix(src_dir).unwrap_or(entry.path());
        if rel.as_os_str().is_empty() {
            continue;
        }
        let name = rel.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else {
            writer.start_file(name, options)?;
            let mut f = File::open(entry.path())?;
            std::io::copy(&mut f, &mut writer)?;
        }
    }
    writer.finish()?;
    Ok(())
}

/// Returns `Some(cleaned_relative_path)` if `raw_name` is safe to extract
/// under a destination directory: no symlink-looking component, not
/// absolute, and no `..` that would escape.
fn clean_entry_name(raw_name: &str) -> Option<PathBuf> {
    let path = Path::new(raw_name);
    let mut stack: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                stack.pop()?;
            }
            Component::Normal(_) => stack.push(comp),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(stack.iter().collect())
}

/// Unzips `src_zip` into `dest_dir`. Rejects any symlink entry outright.
/// Rejects entries whose cleaned name escapes `dest_dir`. If every
/// non-empty, non-`__MACOSX/` entry shares a single top-level directory,
/// that prefix is stripped. Regular files are written with `create_new`
/// so an existing file is never silently clobbered.
pub fn unzip(src_zip: &Path, dest_dir: &Path) -> Result<(), SandboxError> {
    let file = File::open(src_zip)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        names.push(entry.name().to_string());
    }

    let strip_prefix = common_top_level_dir(&names);

    std::fs::create_dir_all(dest_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let raw_name = entry.name().to_string();
        if raw_name.starts_with("__MACOSX/") {
            continue;
        }
        if is_symlink_entry(&entry) {
            return Err(SandboxError::SymlinkInArchive(raw_name));
        }

        let mut cleaned = clean_entry_name(&raw_name)
            .ok_or_else(|| SandboxError::ArchiveEscapes(raw_name.clone()))?;
        if let Some(prefix) = &strip_prefix {
            cleaned = cleaned
                .strip_prefix(prefix)
                .unwrap_or(&cleaned)
                .to_path_buf();
        }
        if cleaned.as_os_str().is_empty() {
            continue;
        }

        let out_path = dest_dir.join(&cleaned);
        if !out_path.starts_with(dest_dir) {
            return Err(SandboxError::ArchiveEscapes(raw_name));
        }

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out_file = File::options()
            .write(true)
            .create_new(true)
            .open(&out_path)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        out_file.write_all(&buf)?;
    }
    Ok(())
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

fn is_symlink_entry(entry: &zip::read::ZipFile<'_>) -> bool {
    matches!(entry.unix_mode(), Some(mode) if mode & S_IFMT == S_IFLNK)
}

/// Shared first path component, but only when at least one entry actually
/// lives beneath it — a zip whose only entry is a top-level *file* (e.g.
/// `server.jar`) must not have that file name itself stripped down to
/// nothing.
fn common_top_level_dir(names: &[String]) -> Option<PathBuf> {
    let mut candidate: Option<String> = None;
    let mut saw_nested = false;
    for name in names {
        if name.is_empty() || name.starts_with("__MACOSX/") {
            continue;
        }
        let mut components = Path::new(name).components();
        let first = components.next()?;
        let Component::Normal(first) = first else {
            return None;
        };
        if components.next().is_some() {
            saw_nested = true;
        }
        let first = first.to_string_lossy().into_owned();
        match &candidate {
            None => candidate = Some(first),
            Some(existing) if *existing == first => {}
            Some(_) => return None,
        }
    }
    if saw_nested {
        candidate.map(PathBuf::from)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;

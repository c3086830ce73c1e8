// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Zip and tar.gz archiving of an instance tree, with progress throttled
//! to at most once per second. Extraction mirrors `elegantmc-fs`'s unzip
//! safety rules (no symlinks, no path escapes) for both formats.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::BackupError;

const PROGRESS_THROTTLE: Duration = Duration::from_secs(1);

/// Running totals reported to the caller's throttled progress callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveProgress {
    pub files_done: u64,
    pub bytes_done: u64,
}

/// Zips every file under `src_dir` into a new archive at `dest_zip`,
/// invoking `on_progress` no more than once per second. Returns the total
/// file count and byte count archived.
pub fn zip_dir(
    src_dir: &Path,
    dest_zip: &Path,
    mut on_progress: impl FnMut(ArchiveProgress),
) -> Result<(u64, u64), BackupError> {
    let file = File::options()
        .write(true)
        .create_new(true)
        .open(dest_zip)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let mut progress = ArchiveProgress::default();
    let mut last_report = Instant::now();

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
            continue;
        }

        writer.start_file(name, options)?;
        let mut f = File::open(entry.path())?;
        let bytes = std::io::copy(&mut f, &mut writer)?;

        progress.files_done += 1;
        progress.bytes_done += bytes;
        if last_report.elapsed() >= PROGRESS_THROTTLE {
            on_progress(progress);
            last_report = Instant::now();
        }
    }
    writer.finish()?;
    on_progress(progress);
    Ok((progress.files_done, progress.bytes_done))
}

/// Writes a gzip-compressed tar of `src_dir` to `dest_tar_gz`.
pub fn tar_gz_dir(
    src_dir: &Path,
    dest_tar_gz: &Path,
    mut on_progress: impl FnMut(ArchiveProgress),
) -> Result<(u64, u64), BackupError> {
    let file = File::options()
        .write(true)
        .create_new(true)
        .open(dest_tar_gz)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut progress = ArchiveProgress::default();
    let mut last_report = Instant::now();

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
        if entry.file_type().is_dir() {
            builder.append_dir(rel, entry.path())?;
            continue;
        }

        let mut f = File::open(entry.path())?;
        let len = f.metadata()?.len();
        builder.append_file(rel, &mut f)?;

        progress.files_done += 1;
        progress.bytes_done += len;
        if last_report.elapsed() >= PROGRESS_THROTTLE {
            on_progress(progress);
            last_report = Instant::now();
        }
    }
    builder.into_inner()?.finish()?;
    on_progress(progress);
    Ok((progress.files_done, progress.bytes_done))
}

/// Cleans an archive entry's name the same way `elegantmc-fs` does: no
/// absolute path, no `..` segment that escapes the destination.
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

/// Unzips `src_zip` into `dest_dir`, rejecting symlink entries and any
/// entry whose cleaned name would escape `dest_dir`.
pub fn unzip(src_zip: &Path, dest_dir: &Path) -> Result<(), BackupError> {
    let file = File::open(src_zip)?;
    let mut archive = zip::ZipArchive::new(file)?;
    std::fs::create_dir_all(dest_dir)?;

    const S_IFMT: u32 = 0o170000;
    const S_IFLNK: u32 = 0o120000;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let raw_name = entry.name().to_string();
        if raw_name.starts_with("__MACOSX/") {
            continue;
        }
        if matches!(entry.unix_mode(), Some(mode) if mode & S_IFMT == S_IFLNK) {
            return Err(BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("symlink entry in archive: {raw_name}"),
            )));
        }
        let cleaned = clean_entry_name(&raw_name).ok_or_else(|| {
            BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("archive entry escapes destination: {raw_name}"),
            ))
        })?;
        if cleaned.as_os_str().is_empty() {
            continue;
        }
        let out_path = dest_dir.join(&cleaned);
        if !out_path.starts_with(dest_dir) {
            return Err(BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("archive entry escapes destination: {raw_name}"),
            )));
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

/// Extracts a gzip-compressed tar into `dest_dir`, applying the same
/// symlink and path-escape rules as [`unzip`].
pub fn untar_gz(src_tar_gz: &Path, dest_dir: &Path) -> Result<(), BackupError> {
    let file = File::open(src_tar_gz)?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    std::fs::create_dir_all(dest_dir)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let header = entry.header();
        if header.entry_type().is_symlink() || header.entry_type().is_hard_link() {
            return Err(BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "symlink entry in archive",
            )));
        }
        let raw_path = entry.path()?.to_string_lossy().into_owned();
        let cleaned = clean_entry_name(&raw_path).ok_or_else(|| {
            BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("archive entry escapes destination: {raw_path}"),
            ))
        })?;
        if cleaned.as_os_str().is_empty() {
            continue;
        }
        let out_path = dest_dir.join(&cleaned);
        if !out_path.starts_with(dest_dir) {
            return Err(BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("archive entry escapes destination: {raw_path}"),
            )));
        }

        if header.entry_type().is_dir() {
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
        std::io::copy(&mut entry, &mut out_file)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;

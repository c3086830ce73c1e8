// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JAR -> required-Java-major inference. Opens the jar, reads
//! `META-INF/MANIFEST.MF` for `Main-Class`, opens that class file inside
//! the jar, and reads the classfile major version from bytes 6-7.

use std::io::Read;
use std::path::Path;

use crate::error::McError;

/// Known alias points for the linear `classfile_major - 44` formula, kept
/// for documentation and as a cross-check: the formula is exact for every
/// JDK release from 8 onward, so the alias table and the formula always
/// agree for these four values.
const ALIASES: &[(u16, u32)] = &[(52, 8), (55, 11), (61, 17), (65, 21)];

/// Converts a classfile major version to the Java major that produced it.
pub fn classfile_major_to_java_major(classfile_major: u16) -> u32 {
    if let Some((_, java)) = ALIASES.iter().find(|(cf, _)| *cf == classfile_major) {
        return *java;
    }
    (classfile_major as i32 - 44).max(1) as u32
}

/// Inspects `jar_path`, returning the Java major required to run it.
pub fn required_java_major(jar_path: &Path) -> Result<u32, McError> {
    let file = std::fs::File::open(jar_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let main_class = read_main_class(&mut archive).map_err(|reason| McError::JarInspection {
        jar: jar_path.display().to_string(),
        reason,
    })?;

    let class_entry_name = format!("{}.class", main_class.replace('.', "/"));
    let mut entry = archive
        .by_name(&class_entry_name)
        .map_err(|_| McError::JarInspection {
            jar: jar_path.display().to_string(),
            reason: format!("Main-Class entry {class_entry_name} not found in jar"),
        })?;

    let mut header = [0u8; 8];
    entry
        .read_exact(&mut header)
        .map_err(|e| McError::JarInspection {
            jar: jar_path.display().to_string(),
            reason: format!("could not read classfile header: {e}"),
        })?;
    let classfile_major = u16::from_be_bytes([header[6], header[7]]);

    Ok(classfile_major_to_java_major(classfile_major))
}

fn read_main_class<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, String> {
    let mut manifest = archive
        .by_name("META-INF/MANIFEST.MF")
        .map_err(|_| "META-INF/MANIFEST.MF not found".to_string())?;
    let mut contents = String::new();
    manifest
        .read_to_string(&mut contents)
        .map_err(|e| e.to_string())?;

    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("Main-Class:") {
            return Ok(value.trim().to_string());
        }
    }
    Err("Main-Class not declared in manifest".to_string())
}

#[cfg(test)]
#[path = "jar_tests.rs"]
mod tests;

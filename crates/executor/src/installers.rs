// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vanilla and Paper jar installers: resolve a version against the
//! upstream manifest, download the jar with hash verification, and
//! optionally accept the EULA.

use std::path::Path;

use elegantmc_fs::download::{download, ExpectedHashes, Progress};
use serde::Deserialize;

use crate::error::ExecutorError;

/// Upstream base URLs, overridable so a Daemon can point at a mirror.
#[derive(Debug, Clone)]
pub struct InstallUrls {
    /// Base for Mojang's piston-meta host; `{base}/mc/game/version_manifest_v2.json`
    /// is the version manifest.
    pub mojang_base_url: String,
    /// Base for PaperMC's v2 API host.
    pub paper_base_url: String,
}

impl Default for InstallUrls {
    fn default() -> Self {
        Self {
            mojang_base_url: "https://piston-meta.mojang.com".to_string(),
            paper_base_url: "https://api.papermc.io".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VersionManifest {
    versions: Vec<VersionManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionManifestEntry {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct VersionPackage {
    downloads: VersionDownloads,
}

#[derive(Debug, Deserialize)]
struct VersionDownloads {
    server: ServerDownload,
}

#[derive(Debug, Deserialize)]
struct ServerDownload {
    url: String,
    sha1: String,
}

/// A resolved, downloadable jar: its URL, its hash, and a default filename.
pub struct ResolvedJar {
    pub url: String,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
    pub default_filename: String,
}

/// Resolves the Vanilla server jar for `version` through Mojang's two-stage
/// manifest (version list -> per-version package).
pub async fn resolve_vanilla(
    client: &reqwest::Client,
    urls: &InstallUrls,
    version: &str,
) -> Result<ResolvedJar, ExecutorError> {
    let manifest_url = format!(
        "{}/mc/game/version_manifest_v2.json",
        urls.mojang_base_url.trim_end_matches('/')
    );
    let manifest: VersionManifest = client.get(&manifest_url).send().await?.json().await?;
    let entry = manifest
        .versions
        .iter()
        .find(|v| v.id == version)
        .ok_or_else(|| ExecutorError::Validation(format!("unknown Vanilla version: {version}")))?;

    let package: VersionPackage = client.get(&entry.url).send().await?.json().await?;

    Ok(ResolvedJar {
        url: package.downloads.server.url,
        sha1: Some(package.downloads.server.sha1),
        sha256: None,
        default_filename: "server.jar".to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct PaperBuildsResponse {
    builds: Vec<PaperBuild>,
}

#[derive(Debug, Deserialize)]
struct PaperBuild {
    build: u32,
    downloads: PaperDownloads,
}

#[derive(Debug, Deserialize)]
struct PaperDownloads {
    application: PaperApplication,
}

#[derive(Debug, Deserialize)]
struct PaperApplication {
    name: String,
    sha256: String,
}

/// Resolves a Paper server jar for `version`, picking `build` if given or
/// the newest known build otherwise.
pub async fn resolve_paper(
    client: &reqwest::Client,
    urls: &InstallUrls,
    version: &str,
    build: Option<u32>,
) -> Result<ResolvedJar, ExecutorError> {
    let base = urls.paper_base_url.trim_end_matches('/');
    let builds_url = format!("{base}/v2/projects/paper/versions/{version}/builds");
    let response: PaperBuildsResponse = client.get(&builds_url).send().await?.json().await?;

    let chosen = match build {
        Some(wanted) => response
            .builds
            .iter()
            .find(|b| b.build == wanted)
            .ok_or_else(|| {
                ExecutorError::Validation(format!(
                    "unknown Paper build {wanted} for version {version}"
                ))
            })?,
        None => response.builds.last().ok_or_else(|| {
            ExecutorError::Validation(format!("no Paper builds published for version {version}"))
        })?,
    };

    let jar_name = &chosen.downloads.application.name;
    let url = format!(
        "{base}/v2/projects/paper/versions/{version}/builds/{}/downloads/{jar_name}",
        chosen.build
    );

    Ok(ResolvedJar {
        url,
        sha1: None,
        sha256: Some(chosen.downloads.application.sha256.clone()),
        default_filename: jar_name.clone(),
    })
}

/// Downloads `resolved` to `instance_dir/<jar_name>`, verifying whichever
/// hash it carries, and forwards throttled progress to `on_progress`.
pub async fn fetch_jar(
    client: &reqwest::Client,
    resolved: &ResolvedJar,
    instance_dir: &Path,
    jar_name: &str,
    mut on_progress: impl FnMut(Progress),
) -> Result<(), ExecutorError> {
    let dest = instance_dir.join(jar_name);
    let expected = ExpectedHashes {
        sha1: resolved.sha1.clone(),
        sha256: resolved.sha256.clone(),
    };
    download(client, &resolved.url, &dest, &expected, &mut on_progress).await?;
    Ok(())
}

/// Writes `eula.txt` with `eula=true` into an instance directory.
pub async fn accept_eula(instance_dir: &Path) -> Result<(), ExecutorError> {
    tokio::fs::write(instance_dir.join("eula.txt"), b"eula=true\n").await?;
    Ok(())
}

#[cfg(test)]
#[path = "installers_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn default_urls_point_at_the_real_mojang_and_paper_hosts() {
    let urls = InstallUrls::default();
    assert!(urls.mojang_base_url.starts_with("https://"));
    assert!(urls.paper_base_url.starts_with("https://"));
}

#[tokio::test]
async fn accept_eula_writes_the_expected_line() {
    let dir = tempdir().unwrap();
    accept_eula(dir.path()).await.unwrap();
    let contents = tokio::fs::read_to_string(dir.path().join("eula.txt"))
        .await
        .unwrap();
    assert_eq!(contents, "eula=true\n");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Java candidate selection: probe each candidate in order with `-version`
//! and pick the smallest reported major that satisfies a requirement.

use tokio::process::Command;

use elegantmc_adapters::run_with_timeout;
use elegantmc_adapters::subprocess::JAVA_PROBE_TIMEOUT;

use crate::error::McError;

/// One probed candidate: the command/path it was found at, and the major
/// version it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaCandidate {
    pub path: String,
    pub major: u32,
}

/// Probes a single candidate (a bare command name or a path) by running
/// `<candidate> -version` and parsing the major out of stderr or stdout.
///
/// `java -version` has printed to stderr since Java 1.0; some distributions
/// print to stdout instead, so both streams are checked.
pub async fn probe(candidate: &str) -> Option<JavaCandidate> {
    let mut cmd = Command::new(candidate);
    cmd.arg("-version");
    let output = run_with_timeout(cmd, JAVA_PROBE_TIMEOUT, "java -version probe")
        .await
        .ok()?;

    let combined = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    parse_major(&combined).map(|major| JavaCandidate {
        path: candidate.to_string(),
        major,
    })
}

/// Parses the major version out of a `java -version`-style line, e.g.
/// `java version "17.0.1"` or `openjdk version "1.8.0_392"`.
fn parse_major(output: &str) -> Option<u32> {
    let line = output.lines().find(|l| l.contains("version"))?;
    let quoted = line.split('"').nth(1)?;
    let mut parts = quoted.split('.');
    let first: u32 = parts.next()?.parse().ok()?;
    if first == 1 {
        // Legacy scheme: "1.8.0_392" means major 8.
        parts.next()?.parse().ok()
    } else {
        Some(first)
    }
}

/// Probes every candidate in order and picks the smallest major that is
/// greater than or equal to `required`.
pub async fn select(candidates: &[String], required: u32) -> Result<JavaCandidate, McError> {
    let mut probed = Vec::new();
    for candidate in candidates {
        if let Some(found) = probe(candidate).await {
            probed.push(found);
        }
    }

    probed
        .iter()
        .filter(|c| c.major >= required)
        .min_by_key(|c| c.major)
        .cloned()
        .ok_or_else(|| McError::NoJavaCandidate {
            required,
            available: probed.iter().map(|c| c.major).collect(),
        })
}

#[cfg(test)]
#[path = "java_tests.rs"]
mod tests;

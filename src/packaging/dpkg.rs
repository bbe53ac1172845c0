// SPDX-License-Identifier: PMPL-1.0-or-later

//! Debian package index backed by `dpkg-query` and `apt-cache`

use crate::packaging::PackageIndex;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

const DPKG_QUERY: &str = "dpkg-query";
const APT_CACHE: &str = "apt-cache";

#[derive(Debug, Default, Clone, Copy)]
pub struct DpkgIndex;

impl DpkgIndex {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        debug!(program, ?args, "querying package index");
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .env("LC_ALL", "C")
            .output()
            .with_context(|| format!("failed to run {}", program))
    }

    fn query_field(&self, format: &str, package: &str) -> Result<Option<String>> {
        let output = self.run(DPKG_QUERY, &["-W", &format!("-f={}", format), package])?;
        if !output.status.success() {
            return Ok(None);
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

impl PackageIndex for DpkgIndex {
    fn owning_package(&self, path: &Path) -> Result<Option<String>> {
        let path = path.to_string_lossy();
        let output = self.run(DPKG_QUERY, &["-S", &path])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(parse_search_output(
            &String::from_utf8_lossy(&output.stdout),
            &path,
        ))
    }

    fn source_package(&self, package: &str) -> Result<Option<String>> {
        self.query_field("${source:Package}", package)
    }

    fn installed_version(&self, package: &str) -> Result<Option<String>> {
        Ok(self
            .query_field("${db:Status-Abbrev}\\t${Version}", package)?
            .and_then(|line| parse_status_version(&line)))
    }

    fn package_exists(&self, package: &str) -> Result<bool> {
        let output = self.run(APT_CACHE, &["show", "--no-all-versions", package])?;
        Ok(output.status.success() && !output.stdout.iter().all(u8::is_ascii_whitespace))
    }
}

/// Pick the owning package out of `dpkg-query -S` output.
///
/// Lines look like `pkg[:arch][, pkg2]: /path`; diversion notices are skipped
/// and the first listed package wins.
fn parse_search_output(stdout: &str, path: &str) -> Option<String> {
    stdout
        .lines()
        .filter(|line| !line.starts_with("diversion by"))
        .filter_map(|line| {
            let (packages, owned) = line.rsplit_once(": ")?;
            (owned.trim() == path).then_some(packages)
        })
        .filter_map(|packages| packages.split(", ").next())
        .map(|package| package.split(':').next().unwrap_or(package).trim())
        .find(|package| !package.is_empty())
        .map(str::to_string)
}

/// Version from a `<status-abbrev>\t<version>` line, only for installed packages
fn parse_status_version(line: &str) -> Option<String> {
    let (status, version) = line.split_once('\t')?;
    let version = version.trim();
    if status.trim_end().starts_with("ii") && !version.is_empty() {
        Some(version.to_string())
    } else {
        None
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later

//! Package index queries
//!
//! The hook only needs four questions answered about the installed system.
//! `Ok(None)` is a definite "not found"; `Err` means the index itself could
//! not be queried.

pub mod dpkg;

use anyhow::Result;
use std::path::Path;

pub use dpkg::DpkgIndex;

pub trait PackageIndex {
    /// Binary package that owns `path`
    fn owning_package(&self, path: &Path) -> Result<Option<String>>;

    /// Source package a binary package was built from
    fn source_package(&self, package: &str) -> Result<Option<String>>;

    /// Installed version of a binary package
    fn installed_version(&self, package: &str) -> Result<Option<String>>;

    /// Whether the distribution archive knows the package at all
    fn package_exists(&self, package: &str) -> Result<bool>;
}

/// Headers package a kernel version must have for module builds to be supported
pub fn kernel_headers_package(kernel: &str) -> String {
    format!("linux-headers-{}", kernel)
}

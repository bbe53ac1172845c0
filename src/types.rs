// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for dkms-apport

use crate::report::ReportOutputFormat;
use std::path::{Path, PathBuf};

/// Default DKMS tree holding per-module build directories
pub const DEFAULT_DKMS_TREE: &str = "/var/lib/dkms";

/// Default location of DKMS module sources
pub const DEFAULT_SOURCE_TREE: &str = "/usr/src";

/// Default apport crash directory
pub const DEFAULT_REPORT_DIR: &str = "/var/crash";

/// Placeholder stored in `PackageVersion` when the package is not installed
pub const NOT_INSTALLED: &str = "(not installed)";

/// How the duplicate signature is derived from a build log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SignaturePolicy {
    /// Whole log, minus lines ending in the current year
    WholeLog,
    /// First compiler error line, keyed by package and version
    #[default]
    FirstError,
}

/// A DKMS module identified by name and version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub name: String,
    pub version: String,
}

impl ModuleRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Source directory DKMS installs the module into, e.g. `/usr/src/nvidia-340.32`
    pub fn source_dir(&self, source_tree: &Path) -> PathBuf {
        source_tree.join(format!("{}-{}", self.name, self.version))
    }

    /// Build directory DKMS leaves its logs in
    pub fn build_dir(&self, dkms_tree: &Path) -> PathBuf {
        dkms_tree.join(&self.name).join(&self.version).join("build")
    }
}

/// Everything one hook invocation needs, parsed once from the command line
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Module name (`-m`); `None` when the flag was omitted
    pub module: Option<String>,
    /// Module version (`-v`); `None` when the flag was omitted
    pub version: Option<String>,
    /// Target kernel version (`-k`)
    pub kernel: Option<String>,
    pub dkms_tree: PathBuf,
    pub source_tree: PathBuf,
    pub report_dir: PathBuf,
    pub signature_policy: SignaturePolicy,
    pub format: ReportOutputFormat,
    /// Print the report instead of writing it
    pub stdout: bool,
}

impl HookConfig {
    /// Configuration with default paths for the given module
    pub fn new(module: Option<String>, version: Option<String>, kernel: Option<String>) -> Self {
        Self {
            module,
            version,
            kernel,
            dkms_tree: PathBuf::from(DEFAULT_DKMS_TREE),
            source_tree: PathBuf::from(DEFAULT_SOURCE_TREE),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            signature_policy: SignaturePolicy::default(),
            format: ReportOutputFormat::default(),
            stdout: false,
        }
    }

    /// Module reference, if both `-m` and `-v` were supplied and non-empty
    pub fn module_ref(&self) -> Option<ModuleRef> {
        match (self.module.as_deref(), self.version.as_deref()) {
            (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
                Some(ModuleRef::new(name, version))
            }
            _ => None,
        }
    }

    /// Kernel version, ignoring an empty `-k`
    pub fn kernel(&self) -> Option<&str> {
        self.kernel.as_deref().filter(|k| !k.is_empty())
    }
}

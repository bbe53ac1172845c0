// SPDX-License-Identifier: PMPL-1.0-or-later

//! The DKMS build-failure hook
//!
//! One linear pass: resolve the owning package, check kernel support, gather
//! the build logs, derive a duplicate signature and write the report once.
//! Every failure is terminal and carries its own exit status.

use crate::buildlog::{self, FGLRX_SOURCE_PACKAGE};
use crate::packaging::{kernel_headers_package, PackageIndex};
use crate::report::{keys, Report, PROBLEM_TYPE_PACKAGE};
use crate::signatures::{first_compiler_error, is_segfault, SignatureContext, SignatureEngine};
use crate::storage;
use crate::types::{HookConfig, ModuleRef, NOT_INSTALLED};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Prefix on every error line the hook prints
pub const ERROR_PREFIX: &str = "ERROR (dkms apport): ";

#[derive(Error, Debug)]
pub enum HookError {
    #[error("both -m and -v are required")]
    Usage,

    #[error("binary package for {module}: {version} not found")]
    BinaryPackageNotFound { module: String, version: String },

    #[error("kernel package {0} is not supported")]
    UnsupportedKernel(String),

    #[error("There was a segmentation fault when trying to build the module")]
    SegmentationFault,

    #[error("unable to determine source package for {0}")]
    SourcePackageUnknown(String),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl HookError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HookError::Usage => 2,
            HookError::SourcePackageUnknown(_) => 3,
            HookError::BinaryPackageNotFound { .. }
            | HookError::UnsupportedKernel(_)
            | HookError::SegmentationFault
            | HookError::Internal(_) => 1,
        }
    }

    /// The line printed on stderr
    pub fn user_message(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

/// What a successful run produced
#[derive(Debug)]
pub struct HookOutcome {
    pub report: Report,
    /// Where the report was written; `None` when it went to stdout
    pub path: Option<PathBuf>,
}

/// Run the hook end to end against `index`
pub fn run(config: &HookConfig, index: &dyn PackageIndex) -> Result<HookOutcome, HookError> {
    let report = build_report(config, index)?;

    if config.stdout {
        print!("{}", config.format.serialize(&report)?);
        return Ok(HookOutcome { report, path: None });
    }

    let path = storage::persist_report(&report, &config.report_dir, config.format)?;
    debug!(path = %path.display(), "report written");
    Ok(HookOutcome {
        report,
        path: Some(path),
    })
}

/// Compose the report without writing anything
pub fn build_report(config: &HookConfig, index: &dyn PackageIndex) -> Result<Report, HookError> {
    let module = config.module_ref().ok_or(HookError::Usage)?;

    let package = owning_package(config, index, &module)?;

    if let Some(kernel) = config.kernel() {
        check_kernel_supported(index, kernel)?;
    }

    let source_package = index
        .source_package(&package)?
        .ok_or_else(|| HookError::SourcePackageUnknown(package.clone()))?;

    let version = match index.installed_version(&package)? {
        Some(version) => version,
        None => {
            debug!(%package, "package is not installed, using placeholder version");
            NOT_INSTALLED.to_string()
        }
    };

    let mut report = Report::new(PROBLEM_TYPE_PACKAGE);
    report.set(keys::PACKAGE, package.as_str());
    report.set(keys::SOURCE_PACKAGE, source_package.as_str());

    if source_package == FGLRX_SOURCE_PACKAGE {
        let path = buildlog::fglrx_log_path(&config.dkms_tree, &module);
        if let Some(log) = buildlog::read_if_exists(&path)? {
            report.set(keys::FGLRX_BUILD_LOG, log);
        }
    }

    report.set(keys::PACKAGE_VERSION, version.as_str());
    report.set(
        keys::TITLE,
        format!(
            "{} {}: {} kernel module failed to build",
            package, version, module.name
        ),
    );

    let make_log = buildlog::make_log_path(&config.dkms_tree, &module);
    match buildlog::read_if_exists(&make_log)? {
        Some(log) => {
            debug!(path = %make_log.display(), bytes = log.len(), "attaching build log");
            if is_segfault(&log) {
                return Err(HookError::SegmentationFault);
            }

            if let Some(line) = first_compiler_error(&log) {
                report.set(keys::ERROR_MESSAGE, line);
            }

            let ctx = SignatureContext::new(package.as_str(), version.as_str());
            let engine = SignatureEngine::new(config.signature_policy);
            match engine.derive(&log, &ctx) {
                Some(signature) => report.set(keys::DUPLICATE_SIGNATURE, signature),
                None => debug!(policy = ?engine.policy(), "no duplicate signature derived"),
            }

            report.set(keys::DKMS_BUILD_LOG, log);
        }
        None => debug!(path = %make_log.display(), "no build log"),
    }

    if let Some(kernel) = config.kernel() {
        report.set(keys::DKMS_KERNEL_VERSION, kernel);
    }

    Ok(report)
}

fn owning_package(
    config: &HookConfig,
    index: &dyn PackageIndex,
    module: &ModuleRef,
) -> Result<String, HookError> {
    let source_dir = module.source_dir(&config.source_tree);
    debug!(path = %source_dir.display(), "resolving owning package");
    index
        .owning_package(&source_dir)?
        .ok_or_else(|| HookError::BinaryPackageNotFound {
            module: module.name.clone(),
            version: module.version.clone(),
        })
}

fn check_kernel_supported(index: &dyn PackageIndex, kernel: &str) -> Result<(), HookError> {
    let headers = kernel_headers_package(kernel);
    debug!(%headers, "checking kernel support");
    if index.package_exists(&headers)? {
        Ok(())
    } else {
        Err(HookError::UnsupportedKernel(headers))
    }
}

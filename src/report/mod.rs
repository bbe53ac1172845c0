// SPDX-License-Identifier: PMPL-1.0-or-later

//! Problem report model and encodings

pub mod formatter;
pub mod output;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use formatter::ReportFormatter;
pub use output::ReportOutputFormat;

/// Well-known report keys
pub mod keys {
    pub const PROBLEM_TYPE: &str = "ProblemType";
    pub const DATE: &str = "Date";
    pub const EXECUTABLE_PATH: &str = "ExecutablePath";
    pub const PACKAGE: &str = "Package";
    pub const SOURCE_PACKAGE: &str = "SourcePackage";
    pub const PACKAGE_VERSION: &str = "PackageVersion";
    pub const TITLE: &str = "Title";
    pub const ERROR_MESSAGE: &str = "ErrorMessage";
    pub const DKMS_BUILD_LOG: &str = "DKMSBuildLog";
    pub const FGLRX_BUILD_LOG: &str = "FglrxBuildLog";
    pub const DKMS_KERNEL_VERSION: &str = "DKMSKernelVersion";
    pub const DUPLICATE_SIGNATURE: &str = "DuplicateSignature";
}

/// Problem type for reports about a package failing to install or build
pub const PROBLEM_TYPE_PACKAGE: &str = "Package";

/// Ordered key/value problem report.
///
/// Iteration yields `ProblemType` first, then the remaining keys sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    fields: BTreeMap<String, String>,
}

impl Report {
    /// New report of `problem_type`, stamped with the current local time
    pub fn new(problem_type: &str) -> Self {
        let mut report = Self::default();
        report.set(keys::PROBLEM_TYPE, problem_type);
        report.set(
            keys::DATE,
            Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
        );
        report
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let head = self
            .fields
            .get_key_value(keys::PROBLEM_TYPE)
            .map(|(k, v)| (k.as_str(), v.as_str()));
        let rest = self
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != keys::PROBLEM_TYPE)
            .map(|(k, v)| (k.as_str(), v.as_str()));
        head.into_iter().chain(rest)
    }
}

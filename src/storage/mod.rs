// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persistent storage for problem reports

use crate::report::{keys, Report, ReportOutputFormat};
use anyhow::{anyhow, Context, Result};
use nix::unistd::getuid;
use std::fs::{self, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const REPORT_MODE: u32 = 0o640;

/// Real uid of the running process
pub fn current_uid() -> u32 {
    getuid().as_raw()
}

/// Path apport expects for `report`: `<dir>/<subject>.<uid>.<ext>`
pub fn report_path(
    report: &Report,
    directory: &Path,
    uid: u32,
    format: ReportOutputFormat,
) -> Result<PathBuf> {
    let subject = if let Some(exe) = report.get(keys::EXECUTABLE_PATH) {
        exe.replace('/', "_")
    } else {
        report
            .get(keys::PACKAGE)
            .and_then(|package| package.split_whitespace().next())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("report has neither ExecutablePath nor Package"))?
    };
    Ok(directory.join(format!("{}.{}.{}", subject, uid, format.extension())))
}

/// Write `report` once, fully encoded, and return its path.
///
/// The content lands in a temporary file beside the target and is renamed
/// into place, so the final path never holds a partial report.
pub fn persist_report(
    report: &Report,
    directory: &Path,
    format: ReportOutputFormat,
) -> Result<PathBuf> {
    let path = report_path(report, directory, current_uid(), format)?;
    let content = format.serialize(report)?;

    fs::create_dir_all(directory)
        .with_context(|| format!("creating {}", directory.display()))?;
    let mut tmp = NamedTempFile::new_in(directory)
        .with_context(|| format!("creating temporary report in {}", directory.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.as_file()
        .set_permissions(Permissions::from_mode(REPORT_MODE))?;
    tmp.persist(&path)
        .map_err(|err| err.error)
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::PROBLEM_TYPE_PACKAGE;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    #[test]
    fn test_report_path_from_package() {
        let mut report = Report::new(PROBLEM_TYPE_PACKAGE);
        report.set(keys::PACKAGE, "nvidia-340 340.76-0ubuntu3");
        let path = report_path(&report, Path::new("/var/crash"), 1000, ReportOutputFormat::Apport)
            .unwrap();
        assert_eq!(path, PathBuf::from("/var/crash/nvidia-340.1000.crash"));
    }

    #[test]
    fn test_report_path_prefers_executable() {
        let mut report = Report::new(PROBLEM_TYPE_PACKAGE);
        report.set(keys::PACKAGE, "dkms");
        report.set(keys::EXECUTABLE_PATH, "/usr/sbin/dkms");
        let path = report_path(&report, Path::new("/tmp"), 0, ReportOutputFormat::Json).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/_usr_sbin_dkms.0.json"));
    }

    #[test]
    fn test_report_path_requires_subject() {
        let report = Report::new(PROBLEM_TYPE_PACKAGE);
        assert!(report_path(&report, Path::new("/tmp"), 0, ReportOutputFormat::Apport).is_err());
    }

    #[test]
    fn test_current_uid_matches_process_owner() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owned");
        fs::write(&path, "").unwrap();
        assert_eq!(current_uid(), fs::metadata(&path).unwrap().uid());
    }

    #[test]
    fn test_persist_writes_single_file() {
        let dir = TempDir::new().unwrap();
        let mut report = Report::new(PROBLEM_TYPE_PACKAGE);
        report.set(keys::PACKAGE, "bcmwl-kernel-source");

        let path = persist_report(&report, dir.path(), ReportOutputFormat::Apport).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("ProblemType: Package\n"));
        assert!(content.contains("Package: bcmwl-kernel-source\n"));

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1, "temporary file must not be left behind");

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, REPORT_MODE);
    }
}

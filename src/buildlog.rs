// SPDX-License-Identifier: PMPL-1.0-or-later

//! Build logs DKMS leaves behind in its tree

use crate::types::ModuleRef;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Source package whose installer writes an extra vendor build log
pub const FGLRX_SOURCE_PACKAGE: &str = "fglrx-installer";

const MAKE_LOG: &str = "make.log";
const FGLRX_MAKE_LOG: &str = "make.sh.log";

/// `make.log` for a module build
pub fn make_log_path(dkms_tree: &Path, module: &ModuleRef) -> PathBuf {
    module.build_dir(dkms_tree).join(MAKE_LOG)
}

/// Vendor `make.sh.log` written by the fglrx installer
pub fn fglrx_log_path(dkms_tree: &Path, module: &ModuleRef) -> PathBuf {
    module.build_dir(dkms_tree).join(FGLRX_MAKE_LOG)
}

/// Read a log as text if it exists.
///
/// A missing file is `Ok(None)`; invalid UTF-8 is replaced rather than rejected.
pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_paths() {
        let module = ModuleRef::new("fglrx", "15.200");
        let tree = Path::new("/var/lib/dkms");
        assert_eq!(
            make_log_path(tree, &module),
            PathBuf::from("/var/lib/dkms/fglrx/15.200/build/make.log")
        );
        assert_eq!(
            fglrx_log_path(tree, &module),
            PathBuf::from("/var/lib/dkms/fglrx/15.200/build/make.sh.log")
        );
    }

    #[test]
    fn test_missing_log_is_none() {
        let dir = TempDir::new().unwrap();
        let log = read_if_exists(&dir.path().join("make.log")).unwrap();
        assert!(log.is_none());
    }

    #[test]
    fn test_empty_log_is_present() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("make.log");
        fs::write(&path, "").unwrap();
        assert_eq!(read_if_exists(&path).unwrap(), Some(String::new()));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("make.log");
        fs::write(&path, b"nv.c: error: \xff bad byte\n").unwrap();
        let log = read_if_exists(&path).unwrap().unwrap();
        assert!(log.starts_with("nv.c: error: "));
        assert!(log.contains('\u{FFFD}'));
    }
}

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use colord_core::errors::SweepError;

/// Sibling path used while a replacement for `path` is being written.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replaces `path` with `bytes` so readers observe either the old or the new
/// content, never a prefix of it.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), SweepError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| SweepError::io("persist-mkdir", parent, err))?;
        }
    }
    let tmp = temp_path(path);
    let mut file = File::create(&tmp).map_err(|err| SweepError::io("persist-create", &tmp, err))?;
    file.write_all(bytes)
        .map_err(|err| SweepError::io("persist-write", &tmp, err))?;
    file.sync_all()
        .map_err(|err| SweepError::io("persist-sync", &tmp, err))?;
    drop(file);
    fs::rename(&tmp, path).map_err(|err| SweepError::io("persist-rename", path, err))
}

/// Removes `path`, treating an already missing file as success.
pub(crate) fn remove_if_exists(path: &Path) -> Result<(), SweepError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SweepError::io("persist-remove", path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_replaces_content_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let path = Path::new("/out/checkpoint.json");
        assert_eq!(temp_path(path), PathBuf::from("/out/checkpoint.json.tmp"));
    }

    #[test]
    fn removing_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        remove_if_exists(&dir.path().join("absent")).unwrap();
    }
}

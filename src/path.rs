//! The path resolver: splits absolute paths into components and walks
//! directories from the root inode.

use crate::constants::{MAX_FILENAME_LEN, MAX_PATH_COMPONENTS};
use crate::device::Device;
use crate::dirent;
use crate::error::{FsError, FsResult};
use crate::inode::{self, Inode};

/// Splits an absolute path into its components.
///
/// Requires `path` to start with `/`. Empty components (`//`, a trailing
/// `/`), components longer than [`MAX_FILENAME_LEN`], and paths with more
/// than [`MAX_PATH_COMPONENTS`] components are rejected. `"/"` yields zero
/// components.
pub fn split_path(path: &str) -> FsResult<Vec<String>> {
    if !path.starts_with('/') {
        return Err(FsError::InvalidPath);
    }
    let mut parts = Vec::new();
    for component in path[1..].split('/') {
        if path == "/" {
            break;
        }
        if component.is_empty() || component.len() > MAX_FILENAME_LEN {
            return Err(FsError::InvalidPath);
        }
        if parts.len() >= MAX_PATH_COMPONENTS {
            return Err(FsError::InvalidPath);
        }
        parts.push(component.to_owned());
    }
    Ok(parts)
}

/// Resolves `path` to an inode index, starting at the root (inode 0).
///
/// If `want_parent` is true, resolution stops one component short, so the
/// last component names an entry not yet required to exist (used by
/// `mkdir`/`create` to locate the parent directory). `resolve("/", true)`
/// and `resolve("/", false)` both return the root, since a one-component
/// path's parent is the root itself and `"/"` splits into zero components.
pub fn resolve(device: &mut Device, path: &str, want_parent: bool) -> FsResult<u32> {
    let parts = split_path(path)?;
    let stop = parts.len().saturating_sub(want_parent as usize);

    let mut current = crate::constants::ROOT_INODE;
    for part in &parts[..stop] {
        let dir = inode::read(device, current)?;
        if !dir.is_valid || !dir.is_directory {
            return Err(FsError::NotADirectory);
        }
        let entry = dirent::find_entry(device, &dir, part)?;
        current = entry.inum;
    }
    Ok(current)
}

/// Splits `path` into its parent inode and basename, resolving the parent.
/// Used by `create`/`mkdir`, which need both.
pub fn resolve_parent_and_basename(device: &mut Device, path: &str) -> FsResult<(u32, String)> {
    let parts = split_path(path)?;
    let basename = parts.last().cloned().ok_or(FsError::InvalidPath)?;
    let parent_inum = resolve(device, path, true)?;
    Ok((parent_inum, basename))
}

/// Reads and validates that `inum` names a live directory inode.
pub fn read_directory(device: &mut Device, inum: u32) -> FsResult<Inode> {
    let inode = inode::read(device, inum)?;
    if !inode.is_valid || !inode.is_directory {
        return Err(FsError::NotADirectory);
    }
    Ok(inode)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn root_has_zero_components() {
        assert_eq!(split_path("/").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn simple_split() {
        assert_eq!(
            split_path("/docs/report.txt").unwrap(),
            vec!["docs".to_owned(), "report.txt".to_owned()]
        );
    }

    #[test]
    fn rejects_missing_leading_slash() {
        assert!(matches!(split_path("docs/a"), Err(FsError::InvalidPath)));
    }

    #[test]
    fn rejects_empty_components() {
        assert!(matches!(split_path("//a"), Err(FsError::InvalidPath)));
        assert!(matches!(split_path("/a/"), Err(FsError::InvalidPath)));
        assert!(matches!(split_path("/a//b"), Err(FsError::InvalidPath)));
    }

    #[test]
    fn rejects_overlong_component() {
        let long = "a".repeat(MAX_FILENAME_LEN + 1);
        let path = format!("/{long}");
        assert!(matches!(split_path(&path), Err(FsError::InvalidPath)));
    }

    #[test]
    fn rejects_too_many_components() {
        let path = "/".to_owned() + &vec!["a"; MAX_PATH_COMPONENTS + 1].join("/");
        assert!(matches!(split_path(&path), Err(FsError::InvalidPath)));
    }
}

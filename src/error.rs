//! Error taxonomy surfaced by every public operation.

use std::fmt;
use std::io;

/// An error returned by a `minifs` operation.
///
/// Every public operation surfaces one of these unchanged; nothing is
/// retried internally. A device error during a multi-step operation (a
/// truncate-then-rewrite, a free-all-blocks-then-invalidate) may leave the
/// file system in an invariant-violating state. This is an accepted
/// limitation, not a bug, since the system has no crash safety.
#[derive(Debug)]
pub enum FsError {
    /// The path does not start with `/`, has an empty or over-long
    /// component, or exceeds the maximum number of components.
    InvalidPath,
    /// A component of the path does not exist.
    NotFound,
    /// A non-leaf path component, or the target of `ls`/`mkdir`/`rmdir`,
    /// is a regular file rather than a directory.
    NotADirectory,
    /// A file operation (`write`/`read`) was invoked on a directory inode.
    IsADirectory,
    /// A directory operation was invoked on a regular file.
    NotAFile,
    /// The target name already exists in the parent directory.
    AlreadyExists,
    /// `rmdir`/`delete` was invoked on a non-empty directory.
    NotEmpty,
    /// The inode table is full.
    NoInodes,
    /// The data bitmap is full, or the parent directory has no free entry
    /// slot.
    NoSpace,
    /// The write request exceeds [`crate::constants::MAX_FILE_SIZE`].
    TooLarge,
    /// The device does not contain a recognizable file system.
    NotFormatted,
    /// The superblock magic does not match [`crate::constants::MAGIC`].
    BadMagic,
    /// The underlying device I/O failed.
    Io(io::Error),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath => write!(f, "invalid path"),
            Self::NotFound => write!(f, "no such file or directory"),
            Self::NotADirectory => write!(f, "not a directory"),
            Self::IsADirectory => write!(f, "is a directory"),
            Self::NotAFile => write!(f, "not a regular file"),
            Self::AlreadyExists => write!(f, "file exists"),
            Self::NotEmpty => write!(f, "directory not empty"),
            Self::NoInodes => write!(f, "no free inodes"),
            Self::NoSpace => write!(f, "no space left on device"),
            Self::TooLarge => write!(f, "file too large"),
            Self::NotFormatted => write!(f, "device is not formatted"),
            Self::BadMagic => write!(f, "bad superblock magic"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type FsResult<T> = Result<T, FsError>;

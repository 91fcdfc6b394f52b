//! MiniFS: a self-contained file system over a fixed-size block-addressable
//! host file.
//!
//! The public entry point is [`fs::FileSystem`]: [`fs::FileSystem::mkfs`]
//! formats a fresh device, [`fs::FileSystem::init`] opens an existing one,
//! and its methods implement the rest of the command surface (`create`,
//! `write`, `read`, `delete`, `mkdir`, `rmdir`, `ls`).

pub mod bitmap;
pub mod constants;
pub mod device;
pub mod dirent;
pub mod error;
pub mod fs;
pub mod inode;
pub mod path;
pub mod superblock;

pub use dirent::DirEntry;
pub use error::{FsError, FsResult};
pub use fs::FileSystem;

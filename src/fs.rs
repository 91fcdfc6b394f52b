//! The public `FileSystem` facade: owns the device handle and the bitmap
//! shadow, and implements every user-facing operation in terms of the
//! lower-level modules.

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::constants::{
    BLOCK_SIZE, MAX_DIRECT_POINTERS, MAX_FILE_SIZE, ROOT_INODE,
};
use crate::device::{Block, Device};
use crate::dirent::{self, DirEntry};
use crate::error::{FsError, FsResult};
use crate::inode::{self, Inode};
use crate::path;
use crate::superblock::Superblock;

/// An open MiniFS file system: a device handle plus the in-memory bitmap
/// shadow, both owned by this value instead of living as process-wide
/// globals.
pub struct FileSystem {
    device: Device,
    bitmap: Bitmap,
}

impl FileSystem {
    /// Formats `path` as a fresh, empty file system: zero-fills the device,
    /// writes a new superblock, an empty bitmap, an empty inode table, and
    /// an initialized root inode.
    pub fn mkfs(path: &Path) -> FsResult<()> {
        let mut device = Device::create_zeroed(path)?;

        Superblock::write_fresh(&mut device)?;

        let bitmap = Bitmap::empty();
        bitmap.save(&mut device)?;

        let zero_block: Block = [0u8; BLOCK_SIZE];
        for i in 0..crate::constants::INODE_BLOCKS {
            device.write_block(crate::constants::INODE_START + i, &zero_block)?;
        }

        let root = Inode {
            size: 0,
            direct_blocks: [0; MAX_DIRECT_POINTERS],
            is_valid: true,
            is_directory: true,
        };
        inode::write(&mut device, ROOT_INODE, root)?;

        device.close()?;
        Ok(())
    }

    /// Opens an existing, already-formatted file system: opens the device,
    /// validates the superblock, and loads the bitmap shadow.
    pub fn init(path: &Path) -> FsResult<Self> {
        let mut device = Device::open(path)?;
        Superblock::read_and_validate(&mut device)?;
        let bitmap = Bitmap::load(&mut device)?;
        Ok(Self { device, bitmap })
    }

    /// Closes the device handle. Equivalent to dropping the `FileSystem`;
    /// provided for callers that want an explicit cleanup step.
    pub fn cleanup(self) -> FsResult<()> {
        self.device.close()
    }

    fn free_all_blocks(&mut self, inode: &mut Inode) -> FsResult<()> {
        for slot in inode.direct_blocks.iter_mut() {
            if *slot != 0 {
                self.bitmap.free(*slot, &mut self.device)?;
                *slot = 0;
            }
        }
        Ok(())
    }

    /// Creates an empty regular file at `path`.
    pub fn create(&mut self, path: &str) -> FsResult<()> {
        let (parent_inum, basename) = path::resolve_parent_and_basename(&mut self.device, path)?;
        let parent = path::read_directory(&mut self.device, parent_inum)?;

        if dirent::find_entry(&mut self.device, &parent, &basename).is_ok() {
            return Err(FsError::AlreadyExists);
        }

        let new_inum = inode::allocate(&mut self.device)?;
        let mut parent = parent;
        dirent::insert(
            &mut self.device,
            &mut self.bitmap,
            parent_inum,
            &mut parent,
            new_inum,
            &basename,
        )?;
        Ok(())
    }

    /// Creates an empty directory at `path`.
    pub fn mkdir(&mut self, path: &str) -> FsResult<()> {
        let (parent_inum, basename) = path::resolve_parent_and_basename(&mut self.device, path)?;
        let parent = path::read_directory(&mut self.device, parent_inum)?;

        if dirent::find_entry(&mut self.device, &parent, &basename).is_ok() {
            return Err(FsError::AlreadyExists);
        }

        let new_inum = inode::allocate(&mut self.device)?;
        let new_dir = Inode {
            size: 0,
            direct_blocks: [0; MAX_DIRECT_POINTERS],
            is_valid: true,
            is_directory: true,
        };
        inode::write(&mut self.device, new_inum, new_dir)?;

        let mut parent = parent;
        dirent::insert(
            &mut self.device,
            &mut self.bitmap,
            parent_inum,
            &mut parent,
            new_inum,
            &basename,
        )?;
        Ok(())
    }

    /// Overwrites the file at `path` with `data`, truncating any existing
    /// content first. Returns the number of bytes written.
    pub fn write(&mut self, path: &str, data: &[u8]) -> FsResult<usize> {
        if data.len() > MAX_FILE_SIZE {
            return Err(FsError::TooLarge);
        }

        let inum = path::resolve(&mut self.device, path, false)?;
        let mut inode = inode::read(&mut self.device, inum)?;
        if !inode.is_valid {
            return Err(FsError::NotFound);
        }
        if inode.is_directory {
            return Err(FsError::IsADirectory);
        }

        self.free_all_blocks(&mut inode)?;

        let mut remaining = data;
        let mut k = 0;
        while !remaining.is_empty() {
            let bnum = self.bitmap.allocate(&mut self.device)?;
            let take = remaining.len().min(BLOCK_SIZE);
            let mut block: Block = [0u8; BLOCK_SIZE];
            block[..take].copy_from_slice(&remaining[..take]);
            self.device.write_block(bnum, &block)?;
            inode.direct_blocks[k] = bnum;
            k += 1;
            remaining = &remaining[take..];
        }
        inode.size = data.len() as u32;
        inode::write(&mut self.device, inum, inode)?;
        Ok(data.len())
    }

    /// Reads up to `cap` bytes from the file at `path` into a freshly
    /// allocated buffer, returning as many bytes as are actually available.
    pub fn read(&mut self, path: &str, cap: usize) -> FsResult<Vec<u8>> {
        let inum = path::resolve(&mut self.device, path, false)?;
        let inode = inode::read(&mut self.device, inum)?;
        if !inode.is_valid {
            return Err(FsError::NotFound);
        }
        if inode.is_directory {
            return Err(FsError::IsADirectory);
        }

        let n = cap.min(inode.size as usize);
        let mut out = Vec::with_capacity(n);
        for &bnum in inode.direct_blocks.iter() {
            if out.len() >= n {
                break;
            }
            if bnum == 0 {
                break;
            }
            let mut block: Block = [0u8; BLOCK_SIZE];
            self.device.read_block(bnum, &mut block)?;
            let take = (n - out.len()).min(BLOCK_SIZE);
            out.extend_from_slice(&block[..take]);
        }
        Ok(out)
    }

    /// Deletes the regular file at `path`.
    pub fn delete(&mut self, path: &str) -> FsResult<()> {
        self.remove_impl(path, false)
    }

    /// Removes the (empty) directory at `path`. Fails on `"/"`, since it
    /// splits into zero path components.
    pub fn rmdir(&mut self, path: &str) -> FsResult<()> {
        self.remove_impl(path, true)
    }

    fn remove_impl(&mut self, path: &str, want_directory: bool) -> FsResult<()> {
        let (parent_inum, basename) = path::resolve_parent_and_basename(&mut self.device, path)?;
        let mut parent = path::read_directory(&mut self.device, parent_inum)?;
        let entry = dirent::find_entry(&mut self.device, &parent, &basename)?;

        let mut target = inode::read(&mut self.device, entry.inum)?;
        if !target.is_valid {
            return Err(FsError::NotFound);
        }
        if want_directory && !target.is_directory {
            return Err(FsError::NotADirectory);
        }

        if target.is_directory {
            let live = dirent::list(&mut self.device, &target)?;
            if !live.is_empty() {
                return Err(FsError::NotEmpty);
            }
        }

        self.free_all_blocks(&mut target)?;
        target.is_valid = false;
        inode::write(&mut self.device, entry.inum, target)?;

        dirent::remove(&mut self.device, parent_inum, &mut parent, &basename)?;
        Ok(())
    }

    /// Lists the contents of the directory at `path`.
    pub fn ls(&mut self, path: &str) -> FsResult<Vec<DirEntry>> {
        let inum = path::resolve(&mut self.device, path, false)?;
        let dir = path::read_directory(&mut self.device, inum)?;
        dirent::list(&mut self.device, &dir)
    }
}

//! The block device: a random-access array of [`BLOCK_COUNT`] blocks of
//! [`BLOCK_SIZE`] bytes backed by a single host file.
//!
//! This is the one component spec'd only at its boundary: open, close,
//! read a block, write a block, all-or-nothing. Everything above this
//! layer works exclusively in terms of block numbers.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::constants::{BLOCK_COUNT, BLOCK_SIZE};
use crate::error::{FsError, FsResult};

/// A single block's worth of bytes.
pub type Block = [u8; BLOCK_SIZE];

/// An open handle to the backing file.
pub struct Device {
    file: File,
}

fn check_block_num(n: u32) -> FsResult<()> {
    if n >= BLOCK_COUNT {
        return Err(FsError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("block number {n} out of range (device has {BLOCK_COUNT} blocks)"),
        )));
    }
    Ok(())
}

impl Device {
    /// Opens an existing device file for reading and writing.
    pub fn open(path: &Path) -> FsResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    /// Creates a fresh device file of exactly `BLOCK_COUNT * BLOCK_SIZE`
    /// zero bytes, truncating any existing file at `path`.
    pub fn create_zeroed(path: &Path) -> FsResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let zero_block: Block = [0u8; BLOCK_SIZE];
        for _ in 0..BLOCK_COUNT {
            file.write_all(&zero_block)?;
        }
        file.flush()?;
        Ok(Self { file })
    }

    /// Reads block `n` in full into `buf`.
    pub fn read_block(&mut self, n: u32, buf: &mut Block) -> FsResult<()> {
        check_block_num(n)?;
        self.file.seek(SeekFrom::Start(n as u64 * BLOCK_SIZE as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Writes `buf` to block `n` in full.
    pub fn write_block(&mut self, n: u32, buf: &Block) -> FsResult<()> {
        check_block_num(n)?;
        self.file.seek(SeekFrom::Start(n as u64 * BLOCK_SIZE as u64))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    /// Flushes and releases the underlying file handle.
    ///
    /// Dropping a `Device` has the same effect; this exists so callers that
    /// want to mirror the original's explicit `cleanup_fs()` call can do so.
    pub fn close(self) -> FsResult<()> {
        let Self { mut file } = self;
        file.flush()?;
        Ok(())
    }
}

//! The inode table: a fixed-count array of inodes packed into a contiguous
//! block range, addressed by index.

use crate::constants::{
    BLOCK_SIZE, INODE_COUNT, INODE_DISK_SIZE, INODE_START, INODES_PER_BLOCK,
    MAX_DIRECT_POINTERS,
};
use crate::device::{Block, Device};
use crate::error::{FsError, FsResult};

/// A single inode record: 24 bytes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub size: u32,
    pub direct_blocks: [u32; MAX_DIRECT_POINTERS],
    pub is_valid: bool,
    pub is_directory: bool,
}

impl Inode {
    /// A fresh, invalid (free) inode.
    pub fn empty() -> Self {
        Self {
            size: 0,
            direct_blocks: [0; MAX_DIRECT_POINTERS],
            is_valid: false,
            is_directory: false,
        }
    }

    fn to_bytes(self) -> [u8; INODE_DISK_SIZE] {
        let mut buf = [0u8; INODE_DISK_SIZE];
        buf[0..4].copy_from_slice(&self.size.to_le_bytes());
        for (i, &b) in self.direct_blocks.iter().enumerate() {
            let off = 4 + i * 4;
            buf[off..off + 4].copy_from_slice(&b.to_le_bytes());
        }
        buf[20] = self.is_valid as u8;
        buf[21] = self.is_directory as u8;
        // bytes 22..24 are the zero padding.
        buf
    }

    fn from_bytes(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= INODE_DISK_SIZE);
        let read_u32 = |off: usize| u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
        let mut direct_blocks = [0u32; MAX_DIRECT_POINTERS];
        for (i, slot) in direct_blocks.iter_mut().enumerate() {
            *slot = read_u32(4 + i * 4);
        }
        Self {
            size: read_u32(0),
            direct_blocks,
            is_valid: buf[20] != 0,
            is_directory: buf[21] != 0,
        }
    }

    fn disk_location(idx: u32) -> FsResult<(u32, usize)> {
        if idx >= INODE_COUNT {
            return Err(FsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("inode index {idx} out of range (table has {INODE_COUNT} inodes)"),
            )));
        }
        let idx = idx as usize;
        let block = INODE_START + (idx / INODES_PER_BLOCK) as u32;
        let slot = idx % INODES_PER_BLOCK;
        Ok((block, slot))
    }
}

/// Reads inode `idx` from the table.
pub fn read(device: &mut Device, idx: u32) -> FsResult<Inode> {
    let (block_num, slot) = Inode::disk_location(idx)?;
    let mut block: Block = [0u8; BLOCK_SIZE];
    device.read_block(block_num, &mut block)?;
    let off = slot * INODE_DISK_SIZE;
    Ok(Inode::from_bytes(&block[off..off + INODE_DISK_SIZE]))
}

/// Writes inode `idx`, preserving every other slot in its host block.
pub fn write(device: &mut Device, idx: u32, inode: Inode) -> FsResult<()> {
    let (block_num, slot) = Inode::disk_location(idx)?;
    let mut block: Block = [0u8; BLOCK_SIZE];
    device.read_block(block_num, &mut block)?;
    let off = slot * INODE_DISK_SIZE;
    block[off..off + INODE_DISK_SIZE].copy_from_slice(&inode.to_bytes());
    device.write_block(block_num, &block)
}

/// Scans for the lowest-index free inode, initializes it as a live regular
/// file with no blocks, persists it, and returns its index.
pub fn allocate(device: &mut Device) -> FsResult<u32> {
    for idx in 0..INODE_COUNT {
        let existing = read(device, idx)?;
        if !existing.is_valid {
            let fresh = Inode {
                size: 0,
                direct_blocks: [0; MAX_DIRECT_POINTERS],
                is_valid: true,
                is_directory: false,
            };
            write(device, idx, fresh)?;
            return Ok(idx);
        }
    }
    Err(FsError::NoInodes)
}

/// Marks inode `idx` free. Does not free its data blocks; callers must do
/// that first via the bitmap.
pub fn free(device: &mut Device, idx: u32) -> FsResult<()> {
    let mut inode = read(device, idx)?;
    inode.is_valid = false;
    write(device, idx, inode)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = env::temp_dir();
        p.push(format!("minifs-inode-test-{name}-{}", std::process::id()));
        p
    }

    #[test]
    fn write_preserves_neighbors() {
        let path = temp_path("neighbors");
        let mut dev = Device::create_zeroed(&path).unwrap();

        let a = Inode {
            size: 10,
            direct_blocks: [11, 0, 0, 0],
            is_valid: true,
            is_directory: false,
        };
        let b = Inode {
            size: 20,
            direct_blocks: [0, 0, 0, 12],
            is_valid: true,
            is_directory: true,
        };
        write(&mut dev, 0, a).unwrap();
        write(&mut dev, 1, b).unwrap();

        assert_eq!(read(&mut dev, 0).unwrap(), a);
        assert_eq!(read(&mut dev, 1).unwrap(), b);
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn allocate_monotonic_without_free() {
        let path = temp_path("monotonic");
        let mut dev = Device::create_zeroed(&path).unwrap();
        let a = allocate(&mut dev).unwrap();
        let b = allocate(&mut dev).unwrap();
        let c = allocate(&mut dev).unwrap();
        assert!(a < b);
        assert!(b < c);
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn exhaustion() {
        let path = temp_path("exhaustion");
        let mut dev = Device::create_zeroed(&path).unwrap();
        for _ in 0..INODE_COUNT {
            allocate(&mut dev).unwrap();
        }
        assert!(matches!(allocate(&mut dev), Err(FsError::NoInodes)));
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn out_of_range_index() {
        let path = temp_path("oor");
        let mut dev = Device::create_zeroed(&path).unwrap();
        assert!(read(&mut dev, INODE_COUNT).is_err());
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }
}

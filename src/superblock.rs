//! The superblock codec. Serializes and validates the fixed header stored
//! at block 0.

use crate::constants::{BLOCK_SIZE, DATA_BLOCK_START, INODE_COUNT, INODE_START};
use crate::device::{Block, Device};
use crate::error::{FsError, FsResult};

/// The on-disk superblock: magic, geometry, all 32-bit little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub magic: u32,
    pub block_size: u32,
    pub fs_size_blocks: u32,
    pub inode_start: u32,
    pub inode_count: u32,
    pub data_start: u32,
}

impl Superblock {
    /// Builds the superblock a fresh `mkfs` writes, from the compiled-in
    /// geometry constants.
    pub fn fresh() -> Self {
        Self {
            magic: crate::constants::MAGIC,
            block_size: BLOCK_SIZE as u32,
            fs_size_blocks: crate::constants::BLOCK_COUNT,
            inode_start: INODE_START,
            inode_count: INODE_COUNT,
            data_start: DATA_BLOCK_START,
        }
    }

    fn to_block(self) -> Block {
        let mut block: Block = [0u8; BLOCK_SIZE];
        block[0..4].copy_from_slice(&self.magic.to_le_bytes());
        block[4..8].copy_from_slice(&self.block_size.to_le_bytes());
        block[8..12].copy_from_slice(&self.fs_size_blocks.to_le_bytes());
        block[12..16].copy_from_slice(&self.inode_start.to_le_bytes());
        block[16..20].copy_from_slice(&self.inode_count.to_le_bytes());
        block[20..24].copy_from_slice(&self.data_start.to_le_bytes());
        block
    }

    fn from_block(block: &Block) -> Self {
        let read_u32 = |off: usize| u32::from_le_bytes(block[off..off + 4].try_into().unwrap());
        Self {
            magic: read_u32(0),
            block_size: read_u32(4),
            fs_size_blocks: read_u32(8),
            inode_start: read_u32(12),
            inode_count: read_u32(16),
            data_start: read_u32(20),
        }
    }

    /// Validates that this superblock matches the compiled-in geometry.
    fn validate(&self) -> FsResult<()> {
        if self.magic != crate::constants::MAGIC {
            return Err(FsError::BadMagic);
        }
        let expected = Self::fresh();
        if self.block_size != expected.block_size
            || self.fs_size_blocks != expected.fs_size_blocks
            || self.inode_start != expected.inode_start
            || self.inode_count != expected.inode_count
            || self.data_start != expected.data_start
        {
            return Err(FsError::NotFormatted);
        }
        Ok(())
    }

    /// Writes a fresh superblock to block 0.
    pub fn write_fresh(device: &mut Device) -> FsResult<()> {
        device.write_block(0, &Self::fresh().to_block())
    }

    /// Reads block 0 and validates it, returning the decoded superblock on
    /// success.
    pub fn read_and_validate(device: &mut Device) -> FsResult<Self> {
        let mut block: Block = [0u8; BLOCK_SIZE];
        device.read_block(0, &mut block)?;
        let sb = Self::from_block(&block);
        sb.validate()?;
        Ok(sb)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = env::temp_dir();
        p.push(format!("minifs-superblock-test-{name}-{}", std::process::id()));
        p
    }

    #[test]
    fn round_trip() {
        let path = temp_path("roundtrip");
        let mut dev = Device::create_zeroed(&path).unwrap();
        Superblock::write_fresh(&mut dev).unwrap();
        let sb = Superblock::read_and_validate(&mut dev).unwrap();
        assert_eq!(sb, Superblock::fresh());
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn rejects_bad_magic() {
        let path = temp_path("badmagic");
        let mut dev = Device::create_zeroed(&path).unwrap();
        // Device is all-zero: magic won't match.
        let err = Superblock::read_and_validate(&mut dev).unwrap_err();
        assert!(matches!(err, FsError::BadMagic));
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }
}

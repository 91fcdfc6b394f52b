//! The data-block bitmap allocator: an in-memory shadow of block 1, tracking
//! free/used state for the data region.

use crate::constants::{BITMAP_BLOCK, BLOCK_SIZE, DATA_BLOCK_COUNT, DATA_BLOCK_START};
use crate::device::{Block, Device};
use crate::error::{FsError, FsResult};

pub struct Bitmap {
    shadow: Block,
}

fn bit_index(bnum: u32) -> FsResult<usize> {
    if bnum < DATA_BLOCK_START || bnum >= DATA_BLOCK_START + DATA_BLOCK_COUNT {
        return Err(FsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("block number {bnum} is outside the data region"),
        )));
    }
    Ok((bnum - DATA_BLOCK_START) as usize)
}

impl Bitmap {
    /// An all-zero (fully free) bitmap, as written by `mkfs`.
    pub fn empty() -> Self {
        Self {
            shadow: [0u8; BLOCK_SIZE],
        }
    }

    /// Reads block 1 into the in-memory shadow.
    pub fn load(device: &mut Device) -> FsResult<Self> {
        let mut shadow: Block = [0u8; BLOCK_SIZE];
        device.read_block(BITMAP_BLOCK, &mut shadow)?;
        Ok(Self { shadow })
    }

    /// Writes the in-memory shadow back to block 1.
    pub fn save(&self, device: &mut Device) -> FsResult<()> {
        device.write_block(BITMAP_BLOCK, &self.shadow)
    }

    /// Tells whether data block `bnum` is free.
    pub fn is_free(&self, bnum: u32) -> FsResult<bool> {
        let bit = bit_index(bnum)?;
        Ok(self.shadow[bit / 8] & (1 << (bit % 8)) == 0)
    }

    /// Marks data block `bnum` as used, in the shadow only.
    pub fn mark_used(&mut self, bnum: u32) -> FsResult<()> {
        let bit = bit_index(bnum)?;
        self.shadow[bit / 8] |= 1 << (bit % 8);
        Ok(())
    }

    /// Marks data block `bnum` as free, in the shadow only.
    pub fn mark_free(&mut self, bnum: u32) -> FsResult<()> {
        let bit = bit_index(bnum)?;
        self.shadow[bit / 8] &= !(1 << (bit % 8));
        Ok(())
    }

    /// Allocates the lowest-index free data block, persists the bitmap, and
    /// returns the allocated block number.
    pub fn allocate(&mut self, device: &mut Device) -> FsResult<u32> {
        for i in 0..DATA_BLOCK_COUNT {
            let bnum = DATA_BLOCK_START + i;
            if self.is_free(bnum)? {
                self.mark_used(bnum)?;
                self.save(device)?;
                return Ok(bnum);
            }
        }
        Err(FsError::NoSpace)
    }

    /// Frees data block `bnum` and persists the bitmap.
    pub fn free(&mut self, bnum: u32, device: &mut Device) -> FsResult<()> {
        self.mark_free(bnum)?;
        self.save(device)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = env::temp_dir();
        p.push(format!("minifs-bitmap-test-{name}-{}", std::process::id()));
        p
    }

    #[test]
    fn allocates_lowest_free_first() {
        let path = temp_path("lowest-first");
        let mut dev = Device::create_zeroed(&path).unwrap();
        let mut bm = Bitmap::empty();
        let a = bm.allocate(&mut dev).unwrap();
        let b = bm.allocate(&mut dev).unwrap();
        let c = bm.allocate(&mut dev).unwrap();
        assert_eq!(a, DATA_BLOCK_START);
        assert_eq!(b, DATA_BLOCK_START + 1);
        assert_eq!(c, DATA_BLOCK_START + 2);

        bm.free(b, &mut dev).unwrap();
        let reused = bm.allocate(&mut dev).unwrap();
        assert_eq!(reused, b, "freed block must be reused before higher ones");
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn exhaustion_reports_no_space() {
        let path = temp_path("exhaustion");
        let mut dev = Device::create_zeroed(&path).unwrap();
        let mut bm = Bitmap::empty();
        for _ in 0..DATA_BLOCK_COUNT {
            bm.allocate(&mut dev).unwrap();
        }
        assert!(matches!(bm.allocate(&mut dev), Err(FsError::NoSpace)));
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn persists_across_reload() {
        let path = temp_path("persist");
        let mut dev = Device::create_zeroed(&path).unwrap();
        let mut bm = Bitmap::empty();
        let a = bm.allocate(&mut dev).unwrap();
        bm.save(&mut dev).unwrap();

        let reloaded = Bitmap::load(&mut dev).unwrap();
        assert!(!reloaded.is_free(a).unwrap());
        drop(dev);
        std::fs::remove_file(&path).unwrap();
    }
}

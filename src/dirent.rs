//! Directory encoding: a directory inode's data blocks hold a packed array
//! of fixed-size `(inum, name)` entries.

use crate::bitmap::Bitmap;
use crate::constants::{
    BLOCK_SIZE, DIRENT_DISK_SIZE, DIRENT_NAME_FIELD, ENTRIES_PER_BLOCK, MAX_DIRECT_POINTERS,
    MAX_FILENAME_LEN,
};
use crate::device::{Block, Device};
use crate::error::{FsError, FsResult};
use crate::inode::{self, Inode};

/// A single directory entry: inode index plus name. `inum == 0` denotes an
/// empty slot (inode 0 is the root and is never named by an entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inum: u32,
    pub name: String,
}

fn encode_name(name: &str) -> FsResult<[u8; DIRENT_NAME_FIELD]> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_FILENAME_LEN {
        return Err(FsError::InvalidPath);
    }
    let mut field = [0u8; DIRENT_NAME_FIELD];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}

fn decode_entry(raw: &[u8]) -> (u32, [u8; DIRENT_NAME_FIELD]) {
    debug_assert!(raw.len() >= DIRENT_DISK_SIZE);
    let inum = u32::from_le_bytes(raw[0..4].try_into().unwrap());
    let mut name = [0u8; DIRENT_NAME_FIELD];
    name.copy_from_slice(&raw[4..4 + DIRENT_NAME_FIELD]);
    (inum, name)
}

fn name_field_to_string(field: &[u8; DIRENT_NAME_FIELD]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn write_entry(block: &mut Block, slot: usize, inum: u32, name_field: &[u8; DIRENT_NAME_FIELD]) {
    let off = slot * DIRENT_DISK_SIZE;
    block[off..off + 4].copy_from_slice(&inum.to_le_bytes());
    block[off + 4..off + DIRENT_DISK_SIZE].copy_from_slice(name_field);
}

/// Scans `dir`'s direct blocks in order and returns the first live entry
/// whose name matches `name` byte-for-byte.
pub fn find_entry(device: &mut Device, dir: &Inode, name: &str) -> FsResult<DirEntry> {
    for &bnum in dir.direct_blocks.iter() {
        if bnum == 0 {
            continue;
        }
        let mut block: Block = [0u8; BLOCK_SIZE];
        device.read_block(bnum, &mut block)?;
        for slot in 0..ENTRIES_PER_BLOCK {
            let off = slot * DIRENT_DISK_SIZE;
            let (inum, name_field) = decode_entry(&block[off..off + DIRENT_DISK_SIZE]);
            if inum == 0 {
                continue;
            }
            if name_field_to_string(&name_field) == name {
                return Ok(DirEntry {
                    inum,
                    name: name.to_owned(),
                });
            }
        }
    }
    Err(FsError::NotFound)
}

/// Lists every live entry in `dir`, in block-then-slot order.
pub fn list(device: &mut Device, dir: &Inode) -> FsResult<Vec<DirEntry>> {
    let mut out = Vec::new();
    for &bnum in dir.direct_blocks.iter() {
        if bnum == 0 {
            continue;
        }
        let mut block: Block = [0u8; BLOCK_SIZE];
        device.read_block(bnum, &mut block)?;
        for slot in 0..ENTRIES_PER_BLOCK {
            let off = slot * DIRENT_DISK_SIZE;
            let (inum, name_field) = decode_entry(&block[off..off + DIRENT_DISK_SIZE]);
            if inum != 0 {
                out.push(DirEntry {
                    inum,
                    name: name_field_to_string(&name_field),
                });
            }
        }
    }
    Ok(out)
}

/// Inserts `(new_inum, name)` into `dir`, allocating a new data block if
/// every existing one is full, and persists the (possibly updated) inode.
///
/// `dir_inum` is `dir`'s own inode index, needed to persist it back.
pub fn insert(
    device: &mut Device,
    bitmap: &mut Bitmap,
    dir_inum: u32,
    dir: &mut Inode,
    new_inum: u32,
    name: &str,
) -> FsResult<()> {
    let name_field = encode_name(name)?;

    for k in 0..MAX_DIRECT_POINTERS {
        let mut block: Block;
        if dir.direct_blocks[k] == 0 {
            let new_block = bitmap.allocate(device)?;
            dir.direct_blocks[k] = new_block;
            inode::write(device, dir_inum, *dir)?;
            block = [0u8; BLOCK_SIZE];
        } else {
            block = [0u8; BLOCK_SIZE];
            device.read_block(dir.direct_blocks[k], &mut block)?;
        }

        for slot in 0..ENTRIES_PER_BLOCK {
            let off = slot * DIRENT_DISK_SIZE;
            let (inum, _) = decode_entry(&block[off..off + DIRENT_DISK_SIZE]);
            if inum == 0 {
                write_entry(&mut block, slot, new_inum, &name_field);
                device.write_block(dir.direct_blocks[k], &block)?;
                dir.size += DIRENT_DISK_SIZE as u32;
                inode::write(device, dir_inum, *dir)?;
                return Ok(());
            }
        }
    }

    Err(FsError::NoSpace)
}

/// Removes the entry named `name` from `dir`, zeroing its slot and
/// persisting the (possibly updated) inode. The data block itself is never
/// deallocated even if it becomes fully empty.
pub fn remove(device: &mut Device, dir_inum: u32, dir: &mut Inode, name: &str) -> FsResult<()> {
    for &bnum in dir.direct_blocks.iter() {
        if bnum == 0 {
            continue;
        }
        let mut block: Block = [0u8; BLOCK_SIZE];
        device.read_block(bnum, &mut block)?;
        for slot in 0..ENTRIES_PER_BLOCK {
            let off = slot * DIRENT_DISK_SIZE;
            let (inum, name_field) = decode_entry(&block[off..off + DIRENT_DISK_SIZE]);
            if inum != 0 && name_field_to_string(&name_field) == name {
                write_entry(&mut block, slot, 0, &[0u8; DIRENT_NAME_FIELD]);
                device.write_block(bnum, &block)?;
                dir.size = dir.size.saturating_sub(DIRENT_DISK_SIZE as u32);
                inode::write(device, dir_inum, *dir)?;
                return Ok(());
            }
        }
    }
    Err(FsError::NotFound)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::MAX_DIR_ENTRIES;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = env::temp_dir();
        p.push(format!("minifs-dirent-test-{name}-{}", std::process::id()));
        p
    }

    fn fresh_dir_fixture(name: &str) -> (Device, Bitmap, Inode) {
        let path = temp_path(name);
        let dev = Device::create_zeroed(&path).unwrap();
        let bitmap = Bitmap::empty();
        let dir = Inode {
            size: 0,
            direct_blocks: [0; MAX_DIRECT_POINTERS],
            is_valid: true,
            is_directory: true,
        };
        (dev, bitmap, dir)
    }

    #[test]
    fn insert_then_find() {
        let (mut dev, mut bm, mut dir) = fresh_dir_fixture("insert-find");
        insert(&mut dev, &mut bm, 0, &mut dir, 1, "hello.txt").unwrap();
        let found = find_entry(&mut dev, &dir, "hello.txt").unwrap();
        assert_eq!(found.inum, 1);
        assert!(find_entry(&mut dev, &dir, "nope").is_err());
    }

    #[test]
    fn remove_clears_slot() {
        let (mut dev, mut bm, mut dir) = fresh_dir_fixture("remove");
        insert(&mut dev, &mut bm, 0, &mut dir, 1, "a").unwrap();
        remove(&mut dev, 0, &mut dir, "a").unwrap();
        assert!(matches!(
            find_entry(&mut dev, &dir, "a"),
            Err(FsError::NotFound)
        ));
        assert!(matches!(remove(&mut dev, 0, &mut dir, "a"), Err(FsError::NotFound)));
    }

    #[test]
    fn capacity_exhaustion() {
        let (mut dev, mut bm, mut dir) = fresh_dir_fixture("capacity");
        for i in 0..MAX_DIR_ENTRIES {
            insert(&mut dev, &mut bm, 0, &mut dir, (i + 1) as u32, &format!("f{i}")).unwrap();
        }
        assert!(matches!(
            insert(&mut dev, &mut bm, 0, &mut dir, 9999, "overflow"),
            Err(FsError::NoSpace)
        ));
    }

    #[test]
    fn list_is_block_then_slot_order() {
        let (mut dev, mut bm, mut dir) = fresh_dir_fixture("list-order");
        insert(&mut dev, &mut bm, 0, &mut dir, 1, "a").unwrap();
        insert(&mut dev, &mut bm, 0, &mut dir, 2, "b").unwrap();
        let entries = list(&mut dev, &dir).unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry {
                    inum: 1,
                    name: "a".into()
                },
                DirEntry {
                    inum: 2,
                    name: "b".into()
                },
            ]
        );
    }
}

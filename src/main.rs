//! `minifs` is a thin command-line shell over the `minifs` library: it
//! parses argv, dispatches to a [`minifs::FileSystem`] operation, and prints
//! user-facing text. All on-disk behavior lives in the library.

use std::path::Path;
use std::process::exit;

use minifs::FileSystem;

/// The device file every command operates on, in the current directory.
const DISK_PATH: &str = "disk.img";

fn print_usage(prog: &str) {
    eprintln!("Usage: {prog} <command> [arguments]");
    eprintln!("Commands:");
    eprintln!("  mkfs                     - Format the disk");
    eprintln!("  mkdir_fs <path>          - Create a directory");
    eprintln!("  create_fs <path>         - Create a file");
    eprintln!("  write_fs <path> <data>   - Write data to a file");
    eprintln!("  read_fs <path>           - Read data from a file");
    eprintln!("  ls_fs <path>             - List directory contents");
    eprintln!("  delete_fs <path>         - Delete a file");
    eprintln!("  rmdir_fs <path>          - Remove a directory");
}

fn open_fs(prog: &str) -> FileSystem {
    FileSystem::init(Path::new(DISK_PATH)).unwrap_or_else(|e| {
        eprintln!("{prog}: failed to initialize file system: {e}");
        eprintln!("{prog}: run 'mkfs' first");
        exit(1);
    })
}

fn cmd_mkfs(prog: &str) -> i32 {
    match FileSystem::mkfs(Path::new(DISK_PATH)) {
        Ok(()) => {
            println!("Disk formatted successfully.");
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to format disk: {e}");
            1
        }
    }
}

fn cmd_mkdir(prog: &str, path: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.mkdir(path) {
        Ok(()) => {
            println!("Directory {path} created successfully.");
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to create directory {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn cmd_create(prog: &str, path: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.create(path) {
        Ok(()) => {
            println!("File {path} created successfully.");
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to create file {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn cmd_write(prog: &str, path: &str, data: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.write(path, data.as_bytes()) {
        Ok(n) => {
            println!("Wrote {n} bytes to {path}.");
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to write to file {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn cmd_read(prog: &str, path: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.read(path, minifs::constants::MAX_FILE_SIZE) {
        Ok(data) => {
            let text = String::from_utf8_lossy(&data);
            println!("Read {} bytes from {path}: \"{text}\"", data.len());
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to read from file {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn cmd_ls(prog: &str, path: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.ls(path) {
        Ok(entries) => {
            println!("Contents of {path}:");
            for entry in entries {
                println!(" - {} (inode: {})", entry.name, entry.inum);
            }
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to list contents of directory {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn cmd_delete(prog: &str, path: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.delete(path) {
        Ok(()) => {
            println!("Deleted file {path} successfully.");
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to delete file {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn cmd_rmdir(prog: &str, path: &str) -> i32 {
    let mut fs = open_fs(prog);
    let result = match fs.rmdir(path) {
        Ok(()) => {
            println!("Removed directory {path} successfully.");
            0
        }
        Err(e) => {
            eprintln!("{prog}: failed to remove directory {path}: {e}");
            1
        }
    };
    let _ = fs.cleanup();
    result
}

fn main() {
    let mut args = std::env::args();
    let prog = args.next().unwrap_or_else(|| "minifs".to_owned());
    let rest: Vec<String> = args.collect();

    let code = match rest.first().map(String::as_str) {
        None => {
            print_usage(&prog);
            1
        }
        Some("mkfs") => cmd_mkfs(&prog),
        Some("mkdir_fs") => match rest.get(1) {
            Some(path) if rest.len() == 2 => cmd_mkdir(&prog, path),
            _ => {
                eprintln!("Usage: {prog} mkdir_fs <path>");
                1
            }
        },
        Some("create_fs") => match rest.get(1) {
            Some(path) if rest.len() == 2 => cmd_create(&prog, path),
            _ => {
                eprintln!("Usage: {prog} create_fs <path>");
                1
            }
        },
        Some("write_fs") => match (rest.get(1), rest.get(2)) {
            (Some(path), Some(data)) if rest.len() == 3 => cmd_write(&prog, path, data),
            _ => {
                eprintln!("Usage: {prog} write_fs <path> <data>");
                1
            }
        },
        Some("read_fs") => match rest.get(1) {
            Some(path) if rest.len() == 2 => cmd_read(&prog, path),
            _ => {
                eprintln!("Usage: {prog} read_fs <path>");
                1
            }
        },
        Some("ls_fs") => match rest.get(1) {
            Some(path) if rest.len() == 2 => cmd_ls(&prog, path),
            _ => {
                eprintln!("Usage: {prog} ls_fs <path>");
                1
            }
        },
        Some("delete_fs") => match rest.get(1) {
            Some(path) if rest.len() == 2 => cmd_delete(&prog, path),
            _ => {
                eprintln!("Usage: {prog} delete_fs <path>");
                1
            }
        },
        Some("rmdir_fs") => match rest.get(1) {
            Some(path) if rest.len() == 2 => cmd_rmdir(&prog, path),
            _ => {
                eprintln!("Usage: {prog} rmdir_fs <path>");
                1
            }
        },
        Some(other) => {
            eprintln!("{prog}: unknown command: {other}");
            print_usage(&prog);
            1
        }
    };

    exit(code);
}

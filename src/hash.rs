//! BLAKE3 content digests of bundle directories

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{self, Result};

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

fn hash_reader(path: &Path, hasher: &mut Hasher) -> Result<()> {
    let file = File::open(path)
        .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(())
}

/// Digest of every file below `path`
///
/// Files are visited sorted by relative path, and each contributes its path
/// and its contents, so renames change the digest too. Hidden files are
/// skipped.
pub fn hash_directory(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Err(error::fs::not_found(path.display().to_string()));
    }

    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    files.sort_by_key(|e| e.path().to_path_buf());

    let mut hasher = Hasher::new();
    for entry in files {
        let file_path = entry.path();
        let relative_path = file_path
            .strip_prefix(path)
            .unwrap_or(file_path)
            .to_string_lossy()
            .replace('\\', "/");
        hasher.update(relative_path.as_bytes());
        hasher.update(b"\0");
        hash_reader(file_path, &mut hasher)?;
        hasher.update(b"\0");
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

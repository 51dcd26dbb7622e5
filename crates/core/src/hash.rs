//! BLAKE3 content hashes used to tell a snapshot apart from its original

use crate::error::{Result, SnapshotError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A BLAKE3 hash (32 bytes)
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct Blake3Hash([u8; 32]);

impl Blake3Hash {
    /// Leading four bytes in hex, for log lines
    pub fn short(&self) -> String {
        self.0[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Hash bytes using BLAKE3
pub fn hash_bytes(data: &[u8]) -> Blake3Hash {
    let hash = blake3::hash(data);
    Blake3Hash(*hash.as_bytes())
}

/// Hash a file using BLAKE3 (streaming, so large originals are never fully buffered)
pub fn hash_file(path: &Path) -> Result<Blake3Hash> {
    let file = File::open(path).map_err(|e| SnapshotError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| SnapshotError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Blake3Hash(*hasher.finalize().as_bytes()))
}

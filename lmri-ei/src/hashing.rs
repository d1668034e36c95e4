//! BLAKE2b digests
//!
//! LORIS stores BLAKE2b-512 as lowercase hex. Digests always cover file
//! contents, never the path.

use blake2::{Blake2b512, Digest};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Calculate the BLAKE2b-512 digest of a file's contents
///
/// **Algorithm:**
/// 1. Read file content in 1MB chunks
/// 2. Feed each chunk to the hasher
/// 3. Return hex-encoded digest
pub fn blake2b_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to open {} for hashing: {}", path.display(), e),
        )
    })?;

    let mut hasher = Blake2b512::new();
    let mut buffer = vec![0u8; 1024 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let digest = format!("{:x}", hasher.finalize());
    tracing::debug!(path = %path.display(), digest = %digest, "Calculated BLAKE2b digest");

    Ok(digest)
}

/// BLAKE2b-512 of an in-memory buffer
pub fn blake2b_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Blake2b512::digest(bytes))
}

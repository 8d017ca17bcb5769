//! Content hashing for change detection
//!
//! Uses SHA-256 over raw file bytes, rendered as lowercase hex.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Hash a byte slice using SHA-256
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Hash a file's contents, streaming in 8KB blocks
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash of the file at `path` if it exists and is readable
pub fn hash_existing(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    hash_file(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_hash_bytes_known_value() {
        assert_eq!(
            hash_bytes(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_file_matches_hash_bytes() -> std::io::Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        let content = "line one\nline two\n".repeat(2000);
        temp_file.write_all(content.as_bytes())?;
        temp_file.flush()?;

        assert_eq!(hash_file(temp_file.path())?, hash_bytes(content.as_bytes()));
        Ok(())
    }

    #[test]
    fn test_hash_existing_missing_file() {
        assert!(hash_existing(Path::new("/nonexistent/guidestore/file.md")).is_none());
    }
}

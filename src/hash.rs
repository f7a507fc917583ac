// src/hash.rs

//! SHA-256 hashing for package ids and packaged file digests
//!
//! Package ids are derived from a canonical text rendering of a
//! configuration, so the same configuration always lands in the same store
//! folder. Packaged files are hashed for the manifest.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// A SHA-256 digest as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    value: String,
}

impl Hash {
    /// Get the hash value as a hex string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// First `len` hex characters, used for short identifiers
    pub fn short(&self, len: usize) -> &str {
        &self.value[..len.min(self.value.len())]
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Compute hash of a byte slice
pub fn hash_bytes(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash {
        value: hex::encode(hasher.finalize()),
    }
}

/// Compute hash of data from a reader
pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<Hash> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(Hash {
        value: hex::encode(hasher.finalize()),
    })
}

/// Stream a file through SHA-256
pub fn hash_file(path: &Path) -> io::Result<Hash> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha256_hash() {
        let hash = hash_bytes(b"Hello, World!");
        assert_eq!(
            hash.as_str(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_reader_matches_bytes() {
        let data = vec![7u8; 20_000];
        let mut cursor = io::Cursor::new(data.clone());
        assert_eq!(hash_reader(&mut cursor).unwrap(), hash_bytes(&data));
    }

    #[test]
    fn test_hash_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Hello, World!").unwrap();
        let hash = hash_file(file.path()).unwrap();
        assert_eq!(hash, hash_bytes(b"Hello, World!"));
    }

    #[test]
    fn test_short() {
        let hash = hash_bytes(b"x");
        assert_eq!(hash.short(16).len(), 16);
        assert!(hash.as_str().starts_with(hash.short(16)));
        assert_eq!(hash.short(1000), hash.as_str());
    }
}

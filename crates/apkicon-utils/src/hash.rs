use std::path::Path;

use crate::error::{HashError, HashResult};

/// Returns the hex-encoded blake3 digest of an in-memory buffer.
///
/// # Example
///
/// ```
/// use apkicon_utils::hash::checksum_bytes;
///
/// assert_eq!(checksum_bytes(b"").len(), 64);
/// ```
pub fn checksum_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Returns the hex-encoded blake3 digest of a file's contents.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be read.
pub fn checksum_file<P: AsRef<Path>>(file_path: P) -> HashResult<String> {
    let file_path = file_path.as_ref();
    let mut hasher = blake3::Hasher::new();
    let mut file = std::fs::File::open(file_path).map_err(|err| {
        HashError::ReadFailed {
            path: file_path.to_path_buf(),
            source: err,
        }
    })?;
    std::io::copy(&mut file, &mut hasher).map_err(|err| {
        HashError::ReadFailed {
            path: file_path.to_path_buf(),
            source: err,
        }
    })?;
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const HELLO_WORLD: &str = "dc5a4edb8240b018124052c330270696f96771a63b45250a5c17d3000e823355";

    #[test]
    fn test_checksum_bytes() {
        assert_eq!(checksum_bytes(b"hello world\n"), HELLO_WORLD);
    }

    #[test]
    fn test_checksum_file_matches_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world\n").unwrap();

        assert_eq!(checksum_file(file.path()).unwrap(), HELLO_WORLD);
    }

    #[test]
    fn test_checksum_file_not_found() {
        assert!(checksum_file("/path/to/nonexistent/base.apk").is_err());
    }
}

//! Random-access index over an in-memory zip archive.
//!
//! Opening an [`ArchiveIndex`] only walks the central directory. Entry
//! payloads are decompressed on [`ArchiveIndex::read`], one entry at a time,
//! so a failure is scoped to the entry being read.

use std::{
    collections::HashMap,
    io::{Cursor, Read},
};

use tracing::trace;
use zip::{result::ZipError, ZipArchive};

use crate::error::{ExtractError, Result};

/// Default cap on a single decompressed icon entry.
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 16 * 1024 * 1024;

/// Default cap on a single decompressed bundle member.
pub const DEFAULT_MAX_MEMBER_SIZE: u64 = 1024 * 1024 * 1024;

/// Upper bounds on how much a single read may decompress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Largest icon payload read from any archive.
    pub max_entry_size: u64,
    /// Largest nested package read out of a bundle.
    pub max_member_size: u64,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            max_member_size: DEFAULT_MAX_MEMBER_SIZE,
        }
    }
}


/// Metadata for one entry of an indexed archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    name: String,
    compressed_size: u64,
    uncompressed_size: u64,
    is_dir: bool,
    position: usize,
}

impl ArchiveEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compressed size recorded in the archive.
    ///
    /// Zero when the entry's local header could not be read; reading such an
    /// entry fails with [`ExtractError::EntryDecodeFailure`].
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// Declared uncompressed size.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Name-addressable view of a zip archive held in memory.
#[derive(Debug, Clone)]
pub struct ArchiveIndex<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    entries: Vec<ArchiveEntry>,
    by_name: HashMap<String, usize>,
    max_entry_size: u64,
}

impl<'a> ArchiveIndex<'a> {
    /// Indexes the central directory of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ContainerUnreadable`] if the buffer has no
    /// valid end-of-central-directory record or the directory is truncated.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|source| ExtractError::ContainerUnreadable { source })?;

        let names: Vec<String> = archive.file_names().map(String::from).collect();
        let mut entries: Vec<ArchiveEntry> = Vec::with_capacity(names.len());
        let mut by_name = HashMap::with_capacity(names.len());

        for (position, name) in names.into_iter().enumerate() {
            let entry = match archive.by_index_raw(position) {
                Ok(file) => {
                    ArchiveEntry {
                        name,
                        compressed_size: file.compressed_size(),
                        uncompressed_size: file.size(),
                        is_dir: file.is_dir(),
                        position,
                    }
                }
                Err(err) => {
                    trace!(entry = %name, error = %err, "unreadable local header");
                    ArchiveEntry {
                        is_dir: name.ends_with('/'),
                        name,
                        compressed_size: 0,
                        uncompressed_size: 0,
                        position,
                    }
                }
            };

            match by_name.get(&entry.name) {
                Some(&slot) => entries[slot] = entry,
                None => {
                    by_name.insert(entry.name.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }

        trace!(entries = entries.len(), "indexed archive");

        Ok(Self {
            archive,
            entries,
            by_name,
            max_entry_size: u64::MAX,
        })
    }

    /// Indexes `bytes`, capping [`ArchiveIndex::read`] at the entry limit.
    pub fn with_limits(bytes: &'a [u8], limits: ReadLimits) -> Result<Self> {
        Ok(Self::open(bytes)?.with_max_entry_size(limits.max_entry_size))
    }

    /// Caps the size of payloads returned by [`ArchiveIndex::read`].
    pub fn with_max_entry_size(mut self, limit: u64) -> Self {
        self.max_entry_size = limit;
        self
    }

    pub fn max_entry_size(&self) -> u64 {
        self.max_entry_size
    }

    /// Entry names in central-directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Entries in central-directory order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.by_name.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decompresses the named entry, subject to the index's size cap.
    ///
    /// # Errors
    ///
    /// * [`ExtractError::EntryNotFound`] if the name is not indexed
    /// * [`ExtractError::EntryTooLarge`] if the payload exceeds the cap
    /// * [`ExtractError::EntryDecodeFailure`] if the payload is corrupt or
    ///   uses an unsupported compression method
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.read_limited(name, self.max_entry_size)
    }

    /// Decompresses the named entry, refusing payloads over `limit` bytes.
    ///
    /// Both the declared size and the bytes actually produced are checked, so
    /// an entry lying about its size cannot grow past the limit.
    pub fn read_limited(&self, name: &str, limit: u64) -> Result<Vec<u8>> {
        let entry = self.entry(name).ok_or_else(|| {
            ExtractError::EntryNotFound {
                name: name.to_string(),
            }
        })?;

        if entry.uncompressed_size > limit {
            return Err(ExtractError::EntryTooLarge {
                name: name.to_string(),
                size: entry.uncompressed_size,
                limit,
            });
        }

        let decode_failure = |source: ZipError| {
            ExtractError::EntryDecodeFailure {
                name: name.to_string(),
                source,
            }
        };

        // Cloning shares the parsed directory; only the cursor is copied.
        let mut archive = self.archive.clone();
        let file = archive.by_index(entry.position).map_err(decode_failure)?;

        let capacity = usize::try_from(entry.uncompressed_size.min(limit)).unwrap_or(0);
        let mut buf = Vec::with_capacity(capacity);
        file.take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|err| decode_failure(ZipError::Io(err)))?;

        let size = buf.len() as u64;
        if size > limit {
            return Err(ExtractError::EntryTooLarge {
                name: name.to_string(),
                size,
                limit,
            });
        }

        trace!(entry = name, size, "read entry");
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use zip::CompressionMethod;

    use super::*;
    use crate::test_utils::{build_zip, build_zip_with, corrupt_payload};

    #[test]
    fn test_open_lists_names_in_directory_order() {
        let bytes = build_zip(&[
            ("AndroidManifest.xml", b"<manifest/>"),
            ("res/mipmap-hdpi/ic_launcher.png", b"hdpi"),
            ("classes.dex", b"dex\n035"),
        ]);
        let index = ArchiveIndex::open(&bytes).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(
            index.names().collect::<Vec<_>>(),
            vec![
                "AndroidManifest.xml",
                "res/mipmap-hdpi/ic_launcher.png",
                "classes.dex"
            ]
        );
        let entry = index.entry("res/mipmap-hdpi/ic_launcher.png").unwrap();
        assert_eq!(entry.uncompressed_size(), 4);
        assert!(!entry.is_dir());
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(matches!(
            ArchiveIndex::open(b"definitely not a zip archive"),
            Err(ExtractError::ContainerUnreadable { .. })
        ));
        assert!(matches!(
            ArchiveIndex::open(&[]),
            Err(ExtractError::ContainerUnreadable { .. })
        ));
    }

    #[test]
    fn test_open_rejects_truncated_directory() {
        let bytes = build_zip(&[("res/mipmap-hdpi/ic_launcher.png", b"icon")]);
        let truncated = &bytes[..bytes.len() / 2];

        assert!(matches!(
            ArchiveIndex::open(truncated),
            Err(ExtractError::ContainerUnreadable { .. })
        ));
    }

    #[test]
    fn test_read_deflated_entry() {
        let payload = vec![7u8; 4096];
        let bytes = build_zip_with(
            &[("res/drawable-xhdpi/ic_launcher.png", payload.as_slice())],
            CompressionMethod::Deflated,
        );
        let index = ArchiveIndex::open(&bytes).unwrap();

        let entry = index.entry("res/drawable-xhdpi/ic_launcher.png").unwrap();
        assert!(entry.compressed_size() < entry.uncompressed_size());
        assert_eq!(
            index.read("res/drawable-xhdpi/ic_launcher.png").unwrap(),
            payload
        );
    }

    #[test]
    fn test_read_missing_entry() {
        let bytes = build_zip(&[("a.txt", b"a")]);
        let index = ArchiveIndex::open(&bytes).unwrap();

        assert!(matches!(
            index.read("b.txt"),
            Err(ExtractError::EntryNotFound { name }) if name == "b.txt"
        ));
    }

    #[test]
    fn test_read_corrupt_entry_is_scoped() {
        let mut bytes = build_zip(&[
            ("res/mipmap-xxxhdpi/ic_launcher.png", b"CORRUPTED-ICON-PAYLOAD"),
            ("res/mipmap-xxhdpi/ic_launcher.png", b"healthy icon payload"),
        ]);
        corrupt_payload(&mut bytes, b"CORRUPTED-ICON-PAYLOAD");
        let index = ArchiveIndex::open(&bytes).unwrap();

        assert!(matches!(
            index.read("res/mipmap-xxxhdpi/ic_launcher.png"),
            Err(ExtractError::EntryDecodeFailure { .. })
        ));
        assert_eq!(
            index.read("res/mipmap-xxhdpi/ic_launcher.png").unwrap(),
            b"healthy icon payload"
        );
    }

    #[test]
    fn test_read_respects_size_limit() {
        let bytes = build_zip(&[("big.png", &[1u8; 64]), ("small.png", &[1u8; 8])]);
        let index = ArchiveIndex::open(&bytes).unwrap().with_max_entry_size(32);

        assert!(matches!(
            index.read("big.png"),
            Err(ExtractError::EntryTooLarge {
                size: 64,
                limit: 32,
                ..
            })
        ));
        assert_eq!(index.read("small.png").unwrap().len(), 8);
        assert_eq!(index.read_limited("big.png", 64).unwrap().len(), 64);
    }

    #[test]
    fn test_with_limits() {
        let bytes = build_zip(&[("big.png", &[1u8; 64])]);
        let limits = ReadLimits {
            max_entry_size: 16,
            ..ReadLimits::default()
        };
        let index = ArchiveIndex::with_limits(&bytes, limits).unwrap();

        assert_eq!(index.max_entry_size(), 16);
        assert!(index.read("big.png").is_err());
        assert_eq!(ArchiveIndex::open(&bytes).unwrap().max_entry_size(), u64::MAX);
    }

    #[test]
    fn test_directories_are_indexed() {
        let bytes = build_zip(&[("res/", b""), ("res/values/strings.xml", b"<r/>")]);
        let index = ArchiveIndex::open(&bytes).unwrap();

        assert!(index.entry("res/").unwrap().is_dir());
        assert!(index.contains("res/values/strings.xml"));
    }
}

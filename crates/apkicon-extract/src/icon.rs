use std::io::Cursor;

use apkicon_utils::hash::checksum_bytes;
use image::ImageReader;

use crate::{error::Result, formats::has_png_signature};

pub const PNG_MIME_TYPE: &str = "image/png";

/// An icon pulled out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    bytes: Vec<u8>,
    source_entry_name: String,
    member_name: Option<String>,
}

impl ResolvedIcon {
    pub fn new(bytes: Vec<u8>, source_entry_name: impl Into<String>) -> Self {
        Self {
            bytes,
            source_entry_name: source_entry_name.into(),
            member_name: None,
        }
    }

    /// Records the bundle member the icon was found in.
    pub fn with_member(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = Some(member_name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Always `image/png`; only PNG entries are ever selected.
    pub fn mime_type(&self) -> &'static str {
        PNG_MIME_TYPE
    }

    /// Full entry name inside the archive that supplied the icon.
    pub fn source_entry_name(&self) -> &str {
        &self.source_entry_name
    }

    /// Bundle member that supplied the icon, `None` for single archives.
    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex blake3 digest of the icon bytes.
    pub fn checksum(&self) -> String {
        checksum_bytes(&self.bytes)
    }

    /// Whether the payload starts with the PNG signature.
    ///
    /// Selection goes by entry name only, so a mislabelled entry can still
    /// come back from a resolver.
    pub fn is_png(&self) -> bool {
        has_png_signature(&self.bytes)
    }

    /// Width and height read from the image header.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(self.bytes.as_slice()))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?;
        Ok(reader.into_dimensions()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::png_icon;

    #[test]
    fn test_accessors() {
        let icon = ResolvedIcon::new(b"not really a png".to_vec(), "res/mipmap-hdpi/ic_launcher.png");

        assert_eq!(icon.mime_type(), "image/png");
        assert_eq!(icon.source_entry_name(), "res/mipmap-hdpi/ic_launcher.png");
        assert_eq!(icon.member_name(), None);
        assert_eq!(icon.len(), 16);
        assert!(!icon.is_empty());
        assert!(!icon.is_png());
        assert_eq!(icon.checksum(), checksum_bytes(b"not really a png"));
        assert!(icon.dimensions().is_err());

        let icon = icon.with_member("base.apk");
        assert_eq!(icon.member_name(), Some("base.apk"));
        assert_eq!(icon.into_bytes(), b"not really a png");
    }

    #[test]
    fn test_dimensions() {
        let icon = ResolvedIcon::new(png_icon(48), "res/mipmap-mdpi/ic_launcher.png");

        assert!(icon.is_png());
        assert_eq!(icon.dimensions().unwrap(), (48, 48));
    }
}

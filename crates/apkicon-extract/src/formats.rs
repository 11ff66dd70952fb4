//! Container kinds and signature sniffing.

use std::{fmt, path::Path, str::FromStr};

/// Magic bytes of a zip local file header.
pub const ZIP_MAGIC_BYTES: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Magic bytes of an empty zip (end of central directory only).
pub const ZIP_EMPTY_MAGIC_BYTES: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

/// Magic bytes for PNG images.
pub const PNG_MAGIC_BYTES: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// How the outer archive should be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A single installable package (`.apk`).
    Single,
    /// A split-package bundle whose members are `.apk` archives (`.apks`).
    Bundle,
}

impl ContainerKind {
    /// Guesses the container kind from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("apk") {
            Some(ContainerKind::Single)
        } else if ext.eq_ignore_ascii_case("apks") {
            Some(ContainerKind::Bundle)
        } else {
            None
        }
    }

    /// Guesses the container kind from a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Single => "single",
            ContainerKind::Bundle => "bundle",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "apk" => Ok(ContainerKind::Single),
            "bundle" | "apks" => Ok(ContainerKind::Bundle),
            other => Err(format!("unknown container kind `{other}` (expected single or bundle)")),
        }
    }
}

/// Returns true if the buffer starts with a zip signature.
///
/// Archives with data prepended before the first local header are still
/// valid zips, so this is a hint and never a gate.
pub fn has_zip_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC_BYTES) || bytes.starts_with(&ZIP_EMPTY_MAGIC_BYTES)
}

/// Returns true if the buffer starts with the PNG signature.
pub fn has_png_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_MAGIC_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            ContainerKind::from_path("/uploads/app.apk"),
            Some(ContainerKind::Single)
        );
        assert_eq!(
            ContainerKind::from_path("Bundle.APKS"),
            Some(ContainerKind::Bundle)
        );
        assert_eq!(ContainerKind::from_path("app.xapk"), None);
        assert_eq!(ContainerKind::from_path("no-extension"), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("single".parse::<ContainerKind>(), Ok(ContainerKind::Single));
        assert_eq!("APKS".parse::<ContainerKind>(), Ok(ContainerKind::Bundle));
        assert!("tarball".parse::<ContainerKind>().is_err());
        assert_eq!(ContainerKind::Bundle.to_string(), "bundle");
    }

    #[test]
    fn test_signatures() {
        assert!(has_zip_signature(b"PK\x03\x04rest"));
        assert!(has_zip_signature(b"PK\x05\x06"));
        assert!(!has_zip_signature(b"MZ"));
        assert!(has_png_signature(&PNG_MAGIC_BYTES));
        assert!(!has_png_signature(b"\x89PN"));
    }
}

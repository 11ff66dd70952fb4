//! Launcher icon extraction for Android packages.
//!
//! Given the raw bytes of an `.apk` or a split-package `.apks` bundle, this
//! crate finds the most representative PNG icon by matching entry names
//! against a ranked catalog of resource paths. Nothing is decoded beyond the
//! zip container: the manifest and the compiled resource table are never
//! consulted.
//!
//! # Example
//!
//! ```no_run
//! use apkicon_extract::{extract_icon, ContainerKind};
//!
//! let bytes = std::fs::read("app.apk").unwrap();
//! if let Some(icon) = extract_icon(&bytes, ContainerKind::Single) {
//!     println!("{} ({} bytes)", icon.source_entry_name(), icon.len());
//! }
//! ```

pub mod archive;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod icon;
pub mod resolver;

#[cfg(test)]
mod test_utils;

pub use archive::{ArchiveEntry, ArchiveIndex, ReadLimits};
pub use catalog::{
    Density, IconPattern, IconRule, NameSpecificity, PatternCatalog, RankedCandidate,
    ResourceClass,
};
pub use error::{ErrorContext, ExtractError, Result};
pub use extractor::{extract_icon, IconExtractor};
pub use formats::{has_png_signature, has_zip_signature, ContainerKind, PNG_MAGIC_BYTES};
pub use icon::{ResolvedIcon, PNG_MIME_TYPE};
pub use resolver::{
    is_package_name, BundleResolver, IconResolver, SingleArchiveResolver, BASE_MODULE_NAMES,
};

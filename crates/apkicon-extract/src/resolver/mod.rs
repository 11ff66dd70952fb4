//! Icon search strategies over an indexed archive.

mod bundle;
mod single;

pub use bundle::{is_package_name, BundleResolver, BASE_MODULE_NAMES};
pub use single::SingleArchiveResolver;

use crate::{archive::ArchiveIndex, icon::ResolvedIcon};

/// Finds the best icon in an archive.
pub trait IconResolver {
    /// Returns `None` once every candidate has been tried and rejected.
    fn resolve(&self, index: &ArchiveIndex<'_>) -> Option<ResolvedIcon>;
}

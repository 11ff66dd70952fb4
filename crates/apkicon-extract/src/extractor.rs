//! Entry point tying the archive index, the catalog and the resolvers
//! together.

use std::{fs, path::Path, sync::Arc};

use apkicon_config::config::Config;
use apkicon_events::{EventSinkHandle, NullSink};
use tracing::debug;

use crate::{
    archive::{ArchiveIndex, ReadLimits},
    catalog::PatternCatalog,
    error::{ErrorContext, ExtractError, Result},
    formats::ContainerKind,
    icon::ResolvedIcon,
    resolver::{BundleResolver, IconResolver, SingleArchiveResolver},
};

/// Configurable icon extractor.
///
/// Holds no per-call state, so one instance can serve any number of
/// extractions, including concurrently.
#[derive(Clone)]
pub struct IconExtractor {
    catalog: PatternCatalog,
    limits: ReadLimits,
    events: EventSinkHandle,
}

impl Default for IconExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IconExtractor {
    /// Creates an extractor with the standard catalog, default limits and no
    /// event sink.
    pub fn new() -> Self {
        Self {
            catalog: PatternCatalog::default(),
            limits: ReadLimits::default(),
            events: Arc::new(NullSink),
        }
    }

    /// Derives read limits from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let limits = ReadLimits {
            max_entry_size: config.max_entry_size()?,
            max_member_size: config.max_member_size()?,
        };
        Ok(Self::new().with_limits(limits))
    }

    pub fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_catalog(mut self, catalog: PatternCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_events(mut self, events: EventSinkHandle) -> Self {
        self.events = events;
        self
    }

    pub fn limits(&self) -> ReadLimits {
        self.limits
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Extracts the best icon, reporting why none was returned.
    ///
    /// # Errors
    ///
    /// * [`ExtractError::ContainerUnreadable`] if `bytes` is not a zip archive
    /// * [`ExtractError::NoIconFound`] if every candidate was missing or
    ///   rejected
    pub fn try_extract(&self, bytes: &[u8], kind: ContainerKind) -> Result<ResolvedIcon> {
        let index = ArchiveIndex::with_limits(bytes, self.limits)?;
        let events = &*self.events;

        let icon = match kind {
            ContainerKind::Single => {
                SingleArchiveResolver::new(&self.catalog)
                    .with_events(events)
                    .resolve(&index)
            }
            ContainerKind::Bundle => {
                BundleResolver::new(&self.catalog)
                    .with_limits(self.limits)
                    .with_events(events)
                    .resolve(&index)
            }
        };

        icon.ok_or(ExtractError::NoIconFound)
    }

    /// Extracts the best icon, or `None`.
    ///
    /// Never fails; the reason for a `None` is logged at debug level.
    pub fn extract(&self, bytes: &[u8], kind: ContainerKind) -> Option<ResolvedIcon> {
        match self.try_extract(bytes, kind) {
            Ok(icon) => Some(icon),
            Err(err) => {
                debug!(%kind, error = %err, "no icon extracted");
                None
            }
        }
    }

    /// Reads a container from disk and extracts its icon.
    ///
    /// When `kind` is `None` it is guessed from the file extension, falling
    /// back to [`ContainerKind::Single`].
    pub fn try_extract_file<P: AsRef<Path>>(
        &self,
        path: P,
        kind: Option<ContainerKind>,
    ) -> Result<ResolvedIcon> {
        let path = path.as_ref();
        let kind = kind
            .or_else(|| ContainerKind::from_path(path))
            .unwrap_or(ContainerKind::Single);
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

        self.try_extract(&bytes, kind)
    }
}

/// Extracts an icon with default settings.
pub fn extract_icon(bytes: &[u8], kind: ContainerKind) -> Option<ResolvedIcon> {
    IconExtractor::new().extract(bytes, kind)
}

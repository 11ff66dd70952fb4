use apkicon_events::{EventSink, ExtractEvent, NullSink};
use tracing::{debug, trace};

use super::{IconResolver, SingleArchiveResolver};
use crate::{
    archive::{ArchiveIndex, ReadLimits},
    catalog::PatternCatalog,
    error::{ExtractError, Result},
    icon::ResolvedIcon,
};

/// Member names that hold the base module of a split bundle, by priority.
pub const BASE_MODULE_NAMES: [&str; 2] = ["base.apk", "base-master.apk"];

/// Whether a bundle entry name looks like a nested package (`*.apk`, any case).
pub fn is_package_name(name: &str) -> bool {
    name.len() >= 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".apk"))
}

/// Searches the `.apk` members of a split-package bundle.
///
/// The base module is tried first. If it is absent or yields nothing, every
/// other package member is tried in listing order. Members are read one at a
/// time and dropped once searched.
pub struct BundleResolver<'a> {
    catalog: &'a PatternCatalog,
    limits: ReadLimits,
    events: &'a dyn EventSink,
}

impl<'a> BundleResolver<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self {
            catalog,
            limits: ReadLimits::default(),
            events: &NullSink,
        }
    }

    pub fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_events(mut self, events: &'a dyn EventSink) -> Self {
        self.events = events;
        self
    }

    fn resolve_member(&self, bundle: &ArchiveIndex<'_>, member: &str) -> Result<ResolvedIcon> {
        self.events.emit(ExtractEvent::MemberOpened {
            member: member.to_string(),
        });

        let bytes = bundle.read_limited(member, self.limits.max_member_size)?;
        let nested = ArchiveIndex::with_limits(&bytes, self.limits)?;

        SingleArchiveResolver::new(self.catalog)
            .with_events(self.events)
            .for_member(member)
            .resolve(&nested)
            .ok_or(ExtractError::NoIconFound)
    }

    fn try_member(&self, bundle: &ArchiveIndex<'_>, member: &str) -> Option<ResolvedIcon> {
        match self.resolve_member(bundle, member) {
            Ok(icon) => Some(icon),
            Err(err) => {
                debug!(member, error = %err, "skipping bundle member");
                self.events.emit(ExtractEvent::MemberRejected {
                    member: member.to_string(),
                    reason: err.reject_reason(),
                });
                None
            }
        }
    }
}

impl IconResolver for BundleResolver<'_> {
    fn resolve(&self, index: &ArchiveIndex<'_>) -> Option<ResolvedIcon> {
        self.events.emit(ExtractEvent::ArchiveOpened {
            member: None,
            entries: index.len(),
        });

        let base = BASE_MODULE_NAMES
            .into_iter()
            .find(|name| index.contains(name));

        if let Some(base) = base {
            trace!(member = base, "trying base module");
            if let Some(icon) = self.try_member(index, base) {
                return Some(icon);
            }
        }

        let members: Vec<&str> = index
            .names()
            .filter(|name| is_package_name(name) && Some(*name) != base)
            .collect();
        trace!(members = members.len(), "trying remaining bundle members");

        for member in members {
            if let Some(icon) = self.try_member(index, member) {
                return Some(icon);
            }
        }

        self.events.emit(ExtractEvent::NoIcon {
            member: None,
        });
        None
    }
}

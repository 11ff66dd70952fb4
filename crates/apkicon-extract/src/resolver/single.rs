use apkicon_events::{EventSink, ExtractEvent, NullSink, RejectReason};
use tracing::{debug, trace};

use super::IconResolver;
use crate::{archive::ArchiveIndex, catalog::PatternCatalog, icon::ResolvedIcon};

/// Searches one package archive for its best-ranked icon.
///
/// Candidates are read best-first; an unreadable, oversized or empty payload
/// is skipped and the next candidate is tried.
pub struct SingleArchiveResolver<'a> {
    catalog: &'a PatternCatalog,
    events: &'a dyn EventSink,
    member: Option<&'a str>,
}

impl<'a> SingleArchiveResolver<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self {
            catalog,
            events: &NullSink,
            member: None,
        }
    }

    pub fn with_events(mut self, events: &'a dyn EventSink) -> Self {
        self.events = events;
        self
    }

    /// Marks the archive as a bundle member; the name is carried into events
    /// and the resolved icon.
    pub fn for_member(mut self, member: &'a str) -> Self {
        self.member = Some(member);
        self
    }

    fn member(&self) -> Option<String> {
        self.member.map(String::from)
    }

    fn reject(&self, entry: &str, rank: usize, reason: RejectReason) {
        debug!(member = ?self.member, entry, rank, ?reason, "skipping icon candidate");
        self.events.emit(ExtractEvent::CandidateRejected {
            member: self.member(),
            entry: entry.to_string(),
            rank,
            reason,
        });
    }
}

impl IconResolver for SingleArchiveResolver<'_> {
    fn resolve(&self, index: &ArchiveIndex<'_>) -> Option<ResolvedIcon> {
        self.events.emit(ExtractEvent::ArchiveOpened {
            member: self.member(),
            entries: index.len(),
        });

        let candidates = self.catalog.rank_entries(index.names());
        trace!(member = ?self.member, candidates = candidates.len(), "ranked icon candidates");

        for candidate in candidates {
            trace!(entry = %candidate.name, rank = candidate.rank, "trying candidate");

            let bytes = match index.read(&candidate.name) {
                Ok(bytes) => bytes,
                Err(err) => {
                    self.reject(&candidate.name, candidate.rank, err.reject_reason());
                    continue;
                }
            };

            if bytes.is_empty() {
                self.reject(&candidate.name, candidate.rank, RejectReason::Empty);
                continue;
            }

            self.events.emit(ExtractEvent::IconResolved {
                member: self.member(),
                entry: candidate.name.clone(),
                size: bytes.len() as u64,
            });

            let icon = ResolvedIcon::new(bytes, candidate.name);
            return Some(match self.member {
                Some(member) => icon.with_member(member),
                None => icon,
            });
        }

        self.events.emit(ExtractEvent::NoIcon {
            member: self.member(),
        });
        None
    }
}

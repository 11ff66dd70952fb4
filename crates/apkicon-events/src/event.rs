use serde::Serialize;

/// Events emitted while an extraction walks an archive.
///
/// They describe what the extractor looked at and why candidates were
/// discarded. Consumers must not rely on them for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExtractEvent {
    /// An archive's central directory was indexed.
    ArchiveOpened {
        /// Bundle member name, or `None` for the outermost archive.
        member: Option<String>,
        entries: usize,
    },
    /// A ranked icon candidate was read but could not be used.
    CandidateRejected {
        member: Option<String>,
        entry: String,
        rank: usize,
        reason: RejectReason,
    },
    /// A bundle member is about to be searched.
    MemberOpened { member: String },
    /// A bundle member could not be searched or held no icon.
    MemberRejected {
        member: String,
        reason: RejectReason,
    },
    /// The search finished with an icon.
    IconResolved {
        member: Option<String>,
        entry: String,
        size: u64,
    },
    /// The search finished without an icon.
    NoIcon { member: Option<String> },
}

/// Why a candidate entry or bundle member was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    /// The payload decompressed to zero bytes.
    Empty,
    /// The payload exceeds the configured read limit.
    TooLarge { size: u64, limit: u64 },
    /// The payload or container could not be decoded.
    Unreadable(String),
    /// The nested archive was readable but held no icon.
    NoIcon,
}

impl ExtractEvent {
    /// Returns the bundle member the event refers to, if any.
    pub fn member(&self) -> Option<&str> {
        match self {
            ExtractEvent::ArchiveOpened { member, .. }
            | ExtractEvent::CandidateRejected { member, .. }
            | ExtractEvent::IconResolved { member, .. }
            | ExtractEvent::NoIcon { member } => member.as_deref(),
            ExtractEvent::MemberOpened { member } | ExtractEvent::MemberRejected { member, .. } => {
                Some(member)
            }
        }
    }
}

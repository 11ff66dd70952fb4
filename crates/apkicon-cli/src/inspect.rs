use std::{fs, path::Path, sync::Arc};

use apkicon_events::{CollectorSink, ExtractEvent};
use apkicon_extract::{
    has_zip_signature, is_package_name, ArchiveIndex, ContainerKind, IconExtractor,
    BASE_MODULE_NAMES,
};
use apkicon_utils::{bytes::format_bytes, hash::checksum_file};
use nu_ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{debug, info, warn};

use crate::{
    error::{CliResult, ErrorContext},
    utils::{icon_or, term_width, Colored, Icons},
};

#[derive(Debug, Serialize)]
pub struct CandidateRow {
    pub member: Option<String>,
    pub rank: usize,
    pub pattern: String,
    pub entry: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct ChosenIcon {
    pub member: Option<String>,
    pub entry: String,
    pub size: usize,
    pub checksum: String,
    pub dimensions: Option<(u32, u32)>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub file: String,
    #[serde(serialize_with = "serialize_kind")]
    pub kind: ContainerKind,
    pub size: u64,
    pub checksum: String,
    pub zip_signature: bool,
    pub candidates: Vec<CandidateRow>,
    pub icon: Option<ChosenIcon>,
    pub error: Option<String>,
    pub events: Vec<ExtractEvent>,
}

fn serialize_kind<S>(kind: &ContainerKind, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(kind.as_str())
}

fn collect_candidates(
    extractor: &IconExtractor,
    index: &ArchiveIndex<'_>,
    member: Option<&str>,
    rows: &mut Vec<CandidateRow>,
) {
    let catalog = extractor.catalog();
    for candidate in catalog.rank_entries(index.names()) {
        let size = index
            .entry(&candidate.name)
            .map(|entry| entry.uncompressed_size())
            .unwrap_or(0);
        rows.push(CandidateRow {
            member: member.map(String::from),
            rank: candidate.rank,
            pattern: catalog.patterns()[candidate.rank].to_string(),
            entry: candidate.name,
            size,
        });
    }
}

/// Lists candidates in the order a bundle search visits its members.
fn bundle_candidates(extractor: &IconExtractor, index: &ArchiveIndex<'_>) -> Vec<CandidateRow> {
    let limits = extractor.limits();
    let base = BASE_MODULE_NAMES
        .into_iter()
        .find(|name| index.contains(name));
    let members = base.into_iter().chain(
        index
            .names()
            .filter(|name| is_package_name(name) && Some(*name) != base),
    );

    let mut rows = Vec::new();
    for member in members {
        let nested = index
            .read_limited(member, limits.max_member_size)
            .and_then(|bytes| {
                let nested = ArchiveIndex::with_limits(&bytes, limits)?;
                let mut member_rows = Vec::new();
                collect_candidates(extractor, &nested, Some(member), &mut member_rows);
                Ok(member_rows)
            });

        match nested {
            Ok(member_rows) => rows.extend(member_rows),
            Err(err) => debug!(member, error = %err, "cannot list bundle member"),
        }
    }
    rows
}

pub fn build_report(
    extractor: &IconExtractor,
    path: &Path,
    kind: Option<ContainerKind>,
) -> CliResult<InspectReport> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let kind = kind
        .or_else(|| ContainerKind::from_path(path))
        .unwrap_or(ContainerKind::Single);

    let candidates = match ArchiveIndex::with_limits(&bytes, extractor.limits()) {
        Ok(index) => {
            match kind {
                ContainerKind::Single => {
                    let mut rows = Vec::new();
                    collect_candidates(extractor, &index, None, &mut rows);
                    rows
                }
                ContainerKind::Bundle => bundle_candidates(extractor, &index),
            }
        }
        Err(_) => Vec::new(),
    };

    let sink = Arc::new(CollectorSink::default());
    let result = extractor
        .clone()
        .with_events(sink.clone())
        .try_extract(&bytes, kind);

    let (icon, error) = match result {
        Ok(icon) => {
            let chosen = ChosenIcon {
                member: icon.member_name().map(String::from),
                entry: icon.source_entry_name().to_string(),
                size: icon.len(),
                checksum: icon.checksum(),
                dimensions: icon.dimensions().ok(),
            };
            (Some(chosen), None)
        }
        Err(err) => (None, Some(err.to_string())),
    };

    Ok(InspectReport {
        file: path.display().to_string(),
        kind,
        size: bytes.len() as u64,
        checksum: checksum_file(path)?,
        zip_signature: has_zip_signature(&bytes),
        candidates,
        icon,
        error,
        events: sink.events(),
    })
}

fn print_report(report: &InspectReport) {
    info!(
        "{} {} ({}, {})",
        icon_or(Icons::PACKAGE, "#"),
        Colored(Blue, &report.file),
        report.kind,
        format_bytes(report.size, 2)
    );
    info!(
        "{} {}",
        icon_or(Icons::CHECKSUM, "#"),
        Colored(Cyan, &report.checksum)
    );

    if !report.zip_signature {
        warn!("File does not start with a zip signature");
    }

    if report.candidates.is_empty() {
        info!("No icon candidates");
    } else {
        let is_bundle = report.kind == ContainerKind::Bundle;
        let mut builder = Builder::new();

        let mut header = vec!["Rank", "Pattern", "Entry", "Size"];
        if is_bundle {
            header.insert(0, "Member");
        }
        builder.push_record(header);

        for row in &report.candidates {
            let mut record = vec![
                row.rank.to_string(),
                row.pattern.clone(),
                row.entry.clone(),
                format_bytes(row.size, 2),
            ];
            if is_bundle {
                record.insert(0, row.member.clone().unwrap_or_default());
            }
            builder.push_record(record);
        }

        let table = builder
            .build()
            .with(Panel::header("Icon Candidates"))
            .with(Style::rounded())
            .with(BorderCorrection {})
            .with(Width::wrap(term_width()).priority(PriorityMax::default()))
            .to_string();

        info!("\n{table}");
    }

    for event in &report.events {
        match event {
            ExtractEvent::CandidateRejected {
                member,
                entry,
                reason,
                ..
            } => {
                warn!(
                    "Skipped {}{}: {:?}",
                    member.as_deref().map(|m| format!("{m}!")).unwrap_or_default(),
                    entry,
                    reason
                );
            }
            ExtractEvent::MemberRejected {
                member,
                reason,
            } => {
                warn!("Skipped member {member}: {reason:?}");
            }
            _ => {}
        }
    }

    match (&report.icon, &report.error) {
        (Some(icon), _) => {
            let source = match &icon.member {
                Some(member) => format!("{member}!{}", icon.entry),
                None => icon.entry.clone(),
            };
            let dimensions = icon
                .dimensions
                .map(|(w, h)| format!(", {w}x{h}"))
                .unwrap_or_default();
            info!(
                "{} {} ({}{})",
                Colored(Green, icon_or(Icons::CHECK, "+")),
                Colored(Cyan, source),
                format_bytes(icon.size as u64, 2),
                dimensions
            );
        }
        (None, Some(error)) => {
            info!("{} {}", Colored(Red, icon_or(Icons::CROSS, "x")), error);
        }
        (None, None) => {
            info!("{} No icon", Colored(Yellow, icon_or(Icons::WARNING, "!")));
        }
    }
}

pub fn inspect_file(
    extractor: &IconExtractor,
    path: &Path,
    kind: Option<ContainerKind>,
    json: bool,
) -> CliResult<()> {
    let report = build_report(extractor, path, kind)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use apkicon_extract::{ContainerKind, ExtractError, IconExtractor, ResolvedIcon};
use apkicon_utils::bytes::format_bytes;
use nu_ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use rayon::{prelude::*, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    error::{CliError, CliResult, ErrorContext},
    utils::{icon_file_name, icon_or, Colored, Icons},
};

pub struct ExtractOptions {
    pub files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub kind: Option<ContainerKind>,
    pub force: bool,
    pub json: bool,
    pub parallel_limit: usize,
}

/// Where extracted icons are written.
#[derive(Debug, PartialEq, Eq)]
enum OutputTarget {
    Dir(PathBuf),
    File(PathBuf),
}

impl OutputTarget {
    fn resolve(output: Option<PathBuf>, inputs: usize) -> CliResult<Self> {
        let Some(path) = output else {
            return Ok(OutputTarget::Dir(PathBuf::from(".")));
        };

        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

        if inputs == 1 && is_png && !path.is_dir() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
            }
            return Ok(OutputTarget::File(path));
        }

        fs::create_dir_all(&path)
            .with_context(|| format!("creating directory {}", path.display()))?;
        Ok(OutputTarget::Dir(path))
    }

    fn path_for(&self, input: &Path) -> PathBuf {
        match self {
            OutputTarget::Dir(dir) => dir.join(icon_file_name(input)),
            OutputTarget::File(file) => file.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractOutcome {
    Extracted {
        input: PathBuf,
        output: PathBuf,
        entry: String,
        member: Option<String>,
        size: usize,
        checksum: String,
        dimensions: Option<(u32, u32)>,
    },
    NoIcon {
        input: PathBuf,
        reason: String,
    },
    Failed {
        input: PathBuf,
        reason: String,
    },
}

type Extraction = (PathBuf, Result<ResolvedIcon, ExtractError>);

fn run_extractions(
    extractor: &IconExtractor,
    files: &[PathBuf],
    kind: Option<ContainerKind>,
    parallel_limit: usize,
) -> CliResult<Vec<Extraction>> {
    let extract_one = |file: &PathBuf| (file.clone(), extractor.try_extract_file(file, kind));

    if parallel_limit <= 1 || files.len() <= 1 {
        return Ok(files.iter().map(extract_one).collect());
    }

    debug!(threads = parallel_limit, files = files.len(), "extracting in parallel");
    let pool = ThreadPoolBuilder::new().num_threads(parallel_limit).build()?;
    Ok(pool.install(|| files.par_iter().map(extract_one).collect()))
}

fn save_icon(input: PathBuf, icon: ResolvedIcon, target: &OutputTarget, force: bool) -> ExtractOutcome {
    let output = target.path_for(&input);

    if output.exists() && !force {
        return ExtractOutcome::Failed {
            input,
            reason: format!("{} already exists (use --force to overwrite)", output.display()),
        };
    }

    if let Err(err) = fs::write(&output, icon.bytes()) {
        return ExtractOutcome::Failed {
            input,
            reason: format!("writing {}: {err}", output.display()),
        };
    }

    ExtractOutcome::Extracted {
        input,
        output,
        entry: icon.source_entry_name().to_string(),
        member: icon.member_name().map(String::from),
        size: icon.len(),
        checksum: icon.checksum(),
        dimensions: icon.dimensions().ok(),
    }
}

fn into_outcome(extraction: Extraction, target: &OutputTarget, force: bool) -> ExtractOutcome {
    match extraction {
        (input, Ok(icon)) => save_icon(input, icon, target, force),
        (input, Err(err @ ExtractError::Io { .. })) => {
            ExtractOutcome::Failed {
                input,
                reason: err.to_string(),
            }
        }
        (input, Err(err)) => {
            ExtractOutcome::NoIcon {
                input,
                reason: err.to_string(),
            }
        }
    }
}

fn print_outcome(outcome: &ExtractOutcome) {
    match outcome {
        ExtractOutcome::Extracted {
            input,
            output,
            entry,
            member,
            size,
            dimensions,
            ..
        } => {
            let source = match member {
                Some(member) => format!("{member}!{entry}"),
                None => entry.clone(),
            };
            let dimensions = dimensions
                .map(|(w, h)| format!(", {w}x{h}"))
                .unwrap_or_default();
            info!(
                "{} {} {} {} ({}{}, {})",
                Colored(Green, icon_or(Icons::CHECK, "+")),
                Colored(Blue, input.display()),
                icon_or(Icons::ARROW, "->"),
                Colored(Cyan, output.display()),
                source,
                dimensions,
                format_bytes(*size as u64, 2)
            );
        }
        ExtractOutcome::NoIcon {
            input,
            reason,
        } => {
            warn!(
                "{} {}: {}",
                Colored(Yellow, icon_or(Icons::WARNING, "!")),
                Colored(Blue, input.display()),
                reason
            );
        }
        ExtractOutcome::Failed {
            input,
            reason,
        } => {
            error!(
                "{} {}: {}",
                Colored(Red, icon_or(Icons::CROSS, "x")),
                Colored(Blue, input.display()),
                reason
            );
        }
    }
}

/// Extracts icons from every input, writes them out and prints a summary.
///
/// Inputs without an icon are reported, not treated as failures.
pub fn extract_icons(extractor: &IconExtractor, options: ExtractOptions) -> CliResult<()> {
    let target = OutputTarget::resolve(options.output, options.files.len())?;
    let extractions = run_extractions(
        extractor,
        &options.files,
        options.kind,
        options.parallel_limit,
    )?;

    let outcomes: Vec<ExtractOutcome> = extractions
        .into_iter()
        .map(|extraction| into_outcome(extraction, &target, options.force))
        .collect();

    let extracted = outcomes
        .iter()
        .filter(|o| matches!(o, ExtractOutcome::Extracted { .. }))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, ExtractOutcome::Failed { .. }))
        .count();
    let missing = outcomes.len() - extracted - failed;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        outcomes.iter().for_each(print_outcome);
        info!(
            "\n{} extracted, {} without icon, {} failed",
            Colored(Green, extracted),
            Colored(Yellow, missing),
            Colored(Red, failed)
        );
    }

    if failed > 0 {
        return Err(CliError::Custom(format!(
            "{failed} of {} inputs could not be processed",
            outcomes.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::{write::SimpleFileOptions, ZipWriter};

    use super::*;

    fn apk(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_output_target_resolution() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(
            OutputTarget::resolve(None, 3).unwrap(),
            OutputTarget::Dir(PathBuf::from("."))
        );

        let file = dir.path().join("nested/icon.PNG");
        assert_eq!(
            OutputTarget::resolve(Some(file.clone()), 1).unwrap(),
            OutputTarget::File(file.clone())
        );
        assert!(dir.path().join("nested").is_dir());

        let as_dir = dir.path().join("icons.png");
        assert_eq!(
            OutputTarget::resolve(Some(as_dir.clone()), 2).unwrap(),
            OutputTarget::Dir(as_dir.clone())
        );
        assert!(as_dir.is_dir());
    }

    #[test]
    fn test_extract_writes_icons() {
        let dir = tempfile::tempdir().unwrap();
        let with_icon = dir.path().join("app.apk");
        let without_icon = dir.path().join("lib.apk");
        fs::write(
            &with_icon,
            apk(&[("res/mipmap-xxhdpi/ic_launcher.png", b"icon bytes")]),
        )
        .unwrap();
        fs::write(&without_icon, apk(&[("classes.dex", b"dex")])).unwrap();

        let out = dir.path().join("out");
        let options = ExtractOptions {
            files: vec![with_icon, without_icon],
            output: Some(out.clone()),
            kind: None,
            force: false,
            json: true,
            parallel_limit: 2,
        };
        extract_icons(&IconExtractor::new(), options).unwrap();

        assert_eq!(fs::read(out.join("app.png")).unwrap(), b"icon bytes");
        assert!(!out.join("lib.png").exists());
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractOptions {
            files: vec![dir.path().join("missing.apk")],
            output: Some(dir.path().to_path_buf()),
            kind: Some(ContainerKind::Single),
            force: false,
            json: true,
            parallel_limit: 1,
        };

        assert!(matches!(
            extract_icons(&IconExtractor::new(), options),
            Err(CliError::Custom(_))
        ));
    }

    #[test]
    fn test_existing_output_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("app.apk");
        fs::write(&input, apk(&[("res/mipmap-hdpi/ic_launcher.png", b"new")])).unwrap();
        let target = OutputTarget::Dir(dir.path().to_path_buf());
        fs::write(dir.path().join("app.png"), b"old").unwrap();

        let extraction = (
            input.clone(),
            IconExtractor::new().try_extract_file(&input, None),
        );
        assert!(matches!(
            into_outcome(extraction, &target, false),
            ExtractOutcome::Failed { .. }
        ));
        assert_eq!(fs::read(dir.path().join("app.png")).unwrap(), b"old");

        let extraction = (
            input.clone(),
            IconExtractor::new().try_extract_file(&input, None),
        );
        assert!(matches!(
            into_outcome(extraction, &target, true),
            ExtractOutcome::Extracted { size: 3, .. }
        ));
        assert_eq!(fs::read(dir.path().join("app.png")).unwrap(), b"new");
    }

    #[test]
    fn test_unreadable_container_is_not_a_failure() {
        let target = OutputTarget::Dir(PathBuf::from("."));
        let extraction = (
            PathBuf::from("broken.apk"),
            IconExtractor::new().try_extract(b"not a zip", ContainerKind::Single),
        );

        assert!(matches!(
            into_outcome(extraction, &target, false),
            ExtractOutcome::NoIcon { .. }
        ));
    }
}

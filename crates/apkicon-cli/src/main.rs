use std::{env, sync::Arc};

use apkicon_config::config::{self, generate_default_config, get_config, set_config_path};
use apkicon_events::{EventSink, EventSinkHandle, ExtractEvent};
use apkicon_extract::IconExtractor;
use apkicon_utils::path::resolve_path;
use clap::Parser;
use cli::Args;
use error::{CliResult, ErrorContext};
use extract::{extract_icons, ExtractOptions};
use inspect::inspect_file;
use logging::setup_logging;
use tracing::{info, trace};
use utils::set_color;

mod cli;
mod error;
mod extract;
mod inspect;
mod logging;
mod utils;

/// Forwards extraction events to the trace log.
struct TraceSink;

impl EventSink for TraceSink {
    fn emit(&self, event: ExtractEvent) {
        trace!(?event, "extract event");
    }
}

fn create_extractor() -> CliResult<IconExtractor> {
    let config = get_config();
    let events: EventSinkHandle = Arc::new(TraceSink);
    Ok(IconExtractor::from_config(&config)?.with_events(events))
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    if let Some(ref c) = args.config {
        let path = resolve_path(c)?;
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        set_config_path(path);
    }

    match args.command {
        cli::Commands::Config {
            generate: true,
        } => {
            generate_default_config()?;
        }
        command => {
            config::init()?;

            if !get_config().display().colors() {
                set_color(false);
            }

            match command {
                cli::Commands::Extract {
                    files,
                    output,
                    kind,
                    force,
                } => {
                    let extractor = create_extractor()?;
                    let options = ExtractOptions {
                        files,
                        output,
                        kind,
                        force,
                        json: args.json,
                        parallel_limit: get_config().parallel_limit(),
                    };
                    extract_icons(&extractor, options)?;
                }
                cli::Commands::Inspect {
                    file,
                    kind,
                } => {
                    let extractor = create_extractor()?;
                    inspect_file(&extractor, &file, kind, args.json)?;
                }
                cli::Commands::Config {
                    ..
                } => {
                    let config = get_config();
                    info!("# {}", config::config_path().display());
                    info!("{}", toml::to_string_pretty(&config)?);
                }
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use apkicon_extract::ContainerKind;

    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_parse_extract_command() {
        let args = Args::parse_from([
            "apkicon", "-v", "extract", "a.apk", "b.apks", "-o", "icons", "--kind", "bundle",
        ]);

        assert_eq!(args.verbose, 1);
        match args.command {
            cli::Commands::Extract {
                files,
                output,
                kind,
                force,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.apk"), PathBuf::from("b.apks")]);
                assert_eq!(output, Some(PathBuf::from("icons")));
                assert_eq!(kind, Some(ContainerKind::Bundle));
                assert!(!force);
            }
            _ => panic!("expected extract command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Args::try_parse_from(["apkicon", "inspect", "a.apk", "--kind", "xapk"]).is_err());
    }

    #[test]
    fn test_parse_config_command() {
        let args = Args::parse_from(["apkicon", "--json", "config", "--generate"]);

        assert!(args.json);
        assert!(matches!(
            args.command,
            cli::Commands::Config {
                generate: true
            }
        ));
    }

    #[test]
    fn test_custom_error_message() {
        let err = CliError::Custom("2 of 3 inputs could not be processed".into());
        assert_eq!(err.to_string(), "2 of 3 inputs could not be processed");
    }
}

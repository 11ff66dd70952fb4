use std::path::PathBuf;

use apkicon_extract::ContainerKind;
use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the launcher icon of one or more packages
    #[command(arg_required_else_help = true)]
    #[clap(name = "extract", visible_alias = "x")]
    Extract {
        /// .apk or .apks files to read
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// Output directory, or output file when a single input is given
        #[arg(required = false, short, long, value_hint = ValueHint::AnyPath)]
        output: Option<PathBuf>,

        /// Container kind (single or bundle); guessed from the extension if omitted
        #[arg(required = false, short, long)]
        kind: Option<ContainerKind>,

        /// Overwrite existing output files
        #[arg(required = false, short, long)]
        force: bool,
    },

    /// Show the ranked icon candidates of a package
    #[command(arg_required_else_help = true)]
    Inspect {
        /// .apk or .apks file to inspect
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Container kind (single or bundle); guessed from the extension if omitted
        #[arg(required = false, short, long)]
        kind: Option<ContainerKind>,
    },

    /// Print the effective configuration
    Config {
        /// Write an annotated default configuration file instead
        #[arg(required = false, short, long)]
        generate: bool,
    },
}

//! Error types for the apkicon binary.

use apkicon_config::error::ConfigError;
use apkicon_extract::ExtractError;
use apkicon_utils::error::{HashError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(code(apkicon::utils))]
    Utils(#[from] UtilsError),

    #[error("Error while {action}")]
    #[diagnostic(code(apkicon::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(apkicon::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(apkicon::toml), help("Check your configuration syntax"))]
    Toml(#[from] toml::ser::Error),

    #[error("Failed to start worker pool: {0}")]
    #[diagnostic(code(apkicon::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{0}")]
    #[diagnostic(code(apkicon::custom))]
    Custom(String),
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        CliError::Utils(err.into())
    }
}

impl From<HashError> for CliError {
    fn from(err: HashError) -> Self {
        CliError::Utils(err.into())
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CliError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

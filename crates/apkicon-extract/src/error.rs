//! Error types for the extract crate.

use miette::Diagnostic;
use thiserror::Error;
use zip::result::ZipError;

/// Errors that can occur while indexing archives or resolving icons.
///
/// None of these cross [`crate::IconExtractor::extract`]; they exist so that
/// failures can be scoped to one entry or one bundle member and skipped.
#[derive(Error, Diagnostic, Debug)]
pub enum ExtractError {
    #[error("Container is not a readable zip archive: {source}")]
    #[diagnostic(
        code(apkicon_extract::container_unreadable),
        help("Make sure the file is a complete .apk or .apks archive")
    )]
    ContainerUnreadable { source: ZipError },

    #[error("Entry `{name}` not found in archive")]
    #[diagnostic(code(apkicon_extract::entry_not_found))]
    EntryNotFound { name: String },

    #[error("Failed to decode entry `{name}`: {source}")]
    #[diagnostic(code(apkicon_extract::entry_decode))]
    EntryDecodeFailure { name: String, source: ZipError },

    #[error("Entry `{name}` is {size} bytes, over the {limit} byte limit")]
    #[diagnostic(
        code(apkicon_extract::entry_too_large),
        help("Raise `max_entry_size` or `max_member_size` in the configuration")
    )]
    EntryTooLarge { name: String, size: u64, limit: u64 },

    #[error("No icon found")]
    #[diagnostic(
        code(apkicon_extract::no_icon),
        help("The archive has no launcher-like PNG under res/mipmap-* or res/drawable-*")
    )]
    NoIconFound,

    #[error("IO error while {action}: {source}")]
    #[diagnostic(code(apkicon_extract::io))]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid icon pattern: {0}")]
    #[diagnostic(code(apkicon_extract::pattern))]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    #[diagnostic(code(apkicon_extract::image))]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(apkicon_extract::config))]
    ConfigError(String),
}

/// A specialized Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

impl From<apkicon_config::error::ConfigError> for ExtractError {
    fn from(err: apkicon_config::error::ConfigError) -> Self {
        ExtractError::ConfigError(err.to_string())
    }
}

/// Attaches an action description to IO failures.
pub trait ErrorContext<T> {
    fn with_context<C: FnOnce() -> String>(self, context: C) -> Result<T>;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C: FnOnce() -> String>(self, context: C) -> Result<T> {
        self.map_err(|source| {
            ExtractError::Io {
                action: context(),
                source,
            }
        })
    }
}

impl ExtractError {
    /// Maps the error onto the reason reported in diagnostic events.
    pub fn reject_reason(&self) -> apkicon_events::RejectReason {
        use apkicon_events::RejectReason;

        match self {
            ExtractError::EntryTooLarge { size, limit, .. } => {
                RejectReason::TooLarge {
                    size: *size,
                    limit: *limit,
                }
            }
            ExtractError::NoIconFound => RejectReason::NoIcon,
            other => RejectReason::Unreadable(other.to_string()),
        }
    }
}

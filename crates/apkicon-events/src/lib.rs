//! Diagnostic events for icon extraction.
//!
//! Extraction never fails loudly: a corrupt entry or a broken bundle member is
//! skipped and the search carries on. Sinks let callers observe those skips
//! without changing the outcome.

mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

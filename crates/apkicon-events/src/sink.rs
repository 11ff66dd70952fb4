use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::ExtractEvent;

/// Trait for consuming extraction events.
///
/// Each frontend provides its own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ExtractEvent);
}

/// Channel-based event sink.
///
/// Sends events through a standard mpsc channel so another thread can
/// report them while extraction runs.
pub struct ChannelSink {
    sender: Sender<ExtractEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<ExtractEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ExtractEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ExtractEvent) {}
}

/// Collector sink that stores all events for inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<ExtractEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<ExtractEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: ExtractEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

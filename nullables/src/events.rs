//! Nullable event sink — record events without sending them.

use ballot_events::{EventSink, PollEvent};
use std::sync::Mutex;

/// A test sink that keeps every event it receives.
#[derive(Default)]
pub struct NullEventSink {
    recorded: Mutex<Vec<PollEvent>>,
}

impl NullEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far (for assertions).
    pub fn recorded(&self) -> Vec<PollEvent> {
        self.recorded.lock().unwrap().clone()
    }

    /// Clear all state.
    pub fn reset(&self) {
        self.recorded.lock().unwrap().clear();
    }
}

impl EventSink for NullEventSink {
    fn record(&self, event: PollEvent) {
        self.recorded.lock().unwrap().push(event);
    }
}

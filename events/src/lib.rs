//! Poll analytics events.
//!
//! Sinks are best-effort: recording an event never blocks and never fails
//! from the caller's point of view. Delivery errors are logged and dropped.

pub mod event;
pub mod sink;

pub use event::PollEvent;
pub use sink::{EventSink, HttpEventSink, LogEventSink};

//! Event sinks.

use crate::PollEvent;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default timeout for a single event delivery.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Receives poll events. Must return immediately and must not fail.
pub trait EventSink: Send + Sync {
    fn record(&self, event: PollEvent);
}

/// Writes events to the log and nowhere else.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn record(&self, event: PollEvent) {
        match &event {
            PollEvent::VoteError { message } => {
                tracing::info!(event = event.name(), message = %message, "poll event")
            }
            PollEvent::VoteSubmitted { option } => {
                tracing::info!(event = event.name(), option = %option, "poll event")
            }
            PollEvent::PageView => tracing::info!(event = event.name(), "poll event"),
        }
    }
}

/// Posts each event as JSON to an analytics endpoint.
///
/// Events are queued on an unbounded channel and delivered by a background
/// task, so `record` never waits on the network.
pub struct HttpEventSink {
    tx: Mutex<Option<mpsc::UnboundedSender<PollEvent>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HttpEventSink {
    /// Start the delivery task. Must be called from within a tokio runtime.
    ///
    /// If the HTTP client cannot be built the sink starts closed and every
    /// event is dropped.
    pub fn spawn(url: impl Into<String>) -> Self {
        let client = match reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build analytics client, events disabled");
                None
            }
        };
        Self::with_client(url, client)
    }

    fn with_client(url: impl Into<String>, client: Option<reqwest::Client>) -> Self {
        let Some(client) = client else {
            return Self {
                tx: Mutex::new(None),
                worker: Mutex::new(None),
            };
        };
        let url = url.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<PollEvent>();

        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match client.post(&url).json(&event).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        tracing::trace!(event = event.name(), "event delivered");
                    }
                    Ok(resp) => {
                        tracing::debug!(event = event.name(), status = %resp.status(), "event rejected");
                    }
                    Err(e) => {
                        tracing::debug!(event = event.name(), error = %e, "event delivery failed");
                    }
                }
            }
        });

        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Stop accepting events and wait up to `timeout` for queued ones to be
    /// delivered. Later `record` calls are dropped.
    pub async fn drain(&self, timeout: Duration) {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(worker) = worker {
            if tokio::time::timeout(timeout, worker).await.is_err() {
                tracing::debug!("event queue not drained before timeout");
            }
        }
    }
}

impl EventSink for HttpEventSink {
    fn record(&self, event: PollEvent) {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        match tx.as_ref() {
            Some(tx) => {
                let _ = tx.send(event);
            }
            None => tracing::debug!(event = event.name(), "event sink closed, event dropped"),
        }
    }
}

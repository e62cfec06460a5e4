use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] ballot_store::StoreError),

    #[error("{0}")]
    Gate(#[from] ballot_gate::GateError),
}

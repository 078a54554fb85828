use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode backend event: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode client command: {0}")]
    Encode(#[source] serde_json::Error),
}

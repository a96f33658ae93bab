use thiserror::Error;

/// The history payload did not have the expected nested-array shape.
/// Malformed entries inside a well-shaped bucket are skipped, not errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("history payload is not a JSON array")]
    PayloadNotArray,
    #[error("history bucket {index} is not a JSON array")]
    BucketNotArray { index: usize },
}

/// Everything that can end a fetch cycle early. Aggregation has no arm
/// here: counting over decoded records cannot fail.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feed returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

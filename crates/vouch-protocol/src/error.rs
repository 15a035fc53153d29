use thiserror::Error;

/// A batch whose bytes could not be parsed. Decoding stops and no records
/// are produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed batch: {0}")]
    Malformed(String),

    #[error("batch too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// One record in a well-formed batch whose id or status does not parse.
///
/// Affects that record only; the rest of the batch decodes normally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("record {index}: invalid {field} {value:?}: {reason}")]
pub struct FieldError {
    /// Position in the batch.
    pub index: usize,
    /// The record's id exactly as sent.
    pub id: String,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

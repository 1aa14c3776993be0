//! Errors raised while reading or writing dynamic values

#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid attribute path: {0}")]
    InvalidPath(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Number {value} does not fit in {target}")]
    NumberOutOfRange { value: String, target: &'static str },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

pub type Result<T> = std::result::Result<T, TfplugError>;

impl From<serde_json::Error> for TfplugError {
    fn from(e: serde_json::Error) -> Self {
        TfplugError::DecodingError(e.to_string())
    }
}

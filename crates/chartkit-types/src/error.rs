//! Codec error taxonomy.
//!
//! Both variants are fatal for the invocation that hits them: a
//! [`DecodeError`] means the host handed the plugin a malformed envelope,
//! an [`EncodeError`] means the plugin built an unrepresentable response
//! (an internal defect, not a normal error path).

use thiserror::Error;

/// Malformed input envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to parse input: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Response envelope could not be serialized.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to marshal output: {0}")]
    Unrepresentable(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_names_the_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DecodeError::from(cause);
        assert!(err.to_string().starts_with("failed to parse input:"));
    }

    #[test]
    fn encode_error_display_names_the_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("!").unwrap_err();
        let err = EncodeError::from(cause);
        assert!(err.to_string().starts_with("failed to marshal output:"));
    }
}

//! JSON codec at the plugin boundary.
//!
//! One request in, one response out. [`decode`] failure short-circuits the
//! whole invocation; the harness in `chartkit-plugin` turns it into an
//! empty `renderedFiles` mapping, a single error, and a non-zero status.

use crate::error::{DecodeError, EncodeError};
use crate::message::{InputMessage, OutputMessage};

/// Decode one input envelope.
pub fn decode(bytes: &[u8]) -> Result<InputMessage, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode one output envelope.
pub fn encode(message: &OutputMessage) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(message)?)
}

//! Byte-level invocation harness.
//!
//! Implements the status convention at the message boundary: decode the
//! envelope, run the plugin, encode the response. A malformed envelope
//! short-circuits the whole invocation deterministically -- empty
//! `renderedFiles`, exactly one error, no `modifiedSourceFiles`, status 1
//! -- with no partial output.

use tracing::{debug, error};

use chartkit_types::{OutputMessage, decode, encode};

use crate::traits::RenderPlugin;

/// Invocation succeeded; `errors` may still report partial failures.
pub const STATUS_OK: u32 = 0;
/// Invocation failed as a whole; the host discards this stage's output.
pub const STATUS_FATAL: u32 = 1;

/// Result of one plugin invocation: the status code for the host plus the
/// encoded response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub status: u32,
    pub payload: Vec<u8>,
}

impl Invocation {
    pub fn is_fatal(&self) -> bool {
        self.status != STATUS_OK
    }
}

/// Run one plugin invocation over raw message bytes.
pub fn invoke<P: RenderPlugin + ?Sized>(plugin: &P, input: &[u8]) -> Invocation {
    debug!(plugin = plugin.name(), bytes = input.len(), "invocation started");

    let message = match decode(input) {
        Ok(message) => message,
        Err(err) => return fatal(plugin.name(), err.to_string()),
    };
    debug!(
        plugin = plugin.name(),
        source_files = message.source_files.len(),
        "input decoded"
    );

    let output = plugin.render(message);

    match encode(&output) {
        Ok(payload) => {
            debug!(
                plugin = plugin.name(),
                rendered = output.rendered_files.len(),
                errors = output.errors.len(),
                "invocation completed"
            );
            Invocation {
                status: STATUS_OK,
                payload,
            }
        }
        Err(err) => fatal(plugin.name(), err.to_string()),
    }
}

fn fatal(plugin: &str, message: String) -> Invocation {
    error!(plugin, error = %message, "invocation failed");
    let envelope = OutputMessage::failure(&message);
    let payload = encode(&envelope).unwrap_or_else(|_| fallback_envelope(&message));
    Invocation {
        status: STATUS_FATAL,
        payload,
    }
}

/// Last-resort error envelope, assembled by hand so it cannot itself fail
/// to serialize.
fn fallback_envelope(message: &str) -> Vec<u8> {
    let quoted =
        serde_json::to_string(message).unwrap_or_else(|_| "\"internal encode error\"".to_string());
    format!("{{\"renderedFiles\":{{}},\"errors\":[{quoted}]}}").into_bytes()
}

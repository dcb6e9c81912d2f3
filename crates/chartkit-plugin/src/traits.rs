//! The render/v1 plugin trait.

use chartkit_types::{InputMessage, OutputMessage};

/// A chart-defined rendering plugin.
///
/// One invocation is one synchronous call: the plugin consumes the input
/// message and produces the complete output message atomically. Per-file
/// failures belong in [`OutputMessage::errors`]; only the harness decides
/// fatal status. Implementations must not keep state between invocations
/// -- the host may terminate the sandbox at any point between calls.
pub trait RenderPlugin: Send + Sync {
    /// Plugin name, used for logging and diagnostics.
    fn name(&self) -> &str;

    /// Transform one input message into one output message.
    fn render(&self, input: InputMessage) -> OutputMessage;
}

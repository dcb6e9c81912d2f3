//! Echo renderer.
//!
//! The smallest useful render plugin: each `.echo` source comes back as a
//! `.yaml` output with a two-line provenance header, content otherwise
//! untouched. Mostly exists to exercise the contract end to end.

use tracing::debug;

use chartkit_plugin::RenderPlugin;
use chartkit_types::{InputMessage, OutputMessage};

const SOURCE_SUFFIX: &str = ".echo";
const OUTPUT_SUFFIX: &str = ".yaml";

#[derive(Debug, Default)]
pub struct EchoPlugin;

impl EchoPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl RenderPlugin for EchoPlugin {
    fn name(&self) -> &str {
        "echo-render"
    }

    fn render(&self, input: InputMessage) -> OutputMessage {
        let mut output = OutputMessage::default();

        for file in &input.source_files {
            let Some(stem) = file.name.strip_suffix(SOURCE_SUFFIX) else {
                continue;
            };
            debug!(file = %file.name, "echoing source");
            let content = format!(
                "# Rendered by echo-render plugin\n# Release: {}\n{}",
                input.release.name,
                file.text(),
            );
            output
                .rendered_files
                .insert(format!("{stem}{OUTPUT_SUFFIX}"), content);
        }

        output
    }
}

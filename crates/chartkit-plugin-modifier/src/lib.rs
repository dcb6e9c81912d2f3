//! Source-file transform plugin.
//!
//! Exercises the `modifiedSourceFiles` half of the contract: one pass over
//! the received working set that deletes the first file, prefixes the
//! second, renames the third (`.test` to `.renamed`), passes the rest
//! through, and appends one new file for the next stage. The plugin also
//! renders a ConfigMap summarizing every action it took, so a chart author
//! can see the handoff in the final manifests.

use tracing::debug;

use chartkit_plugin::{RenderPlugin, TransformPlan};
use chartkit_types::{InputMessage, OutputMessage, SourceFile};

const SUMMARY_NAME: &str = "sourcefiles-modifier-summary.yaml";
const ADDED_NAME: &str = "templates/file4.test";
const ADDED_CONTENT: &str =
    "# This file was added by sourcefiles-modifier plugin\nkey: added-by-plugin-1";

#[derive(Debug, Default)]
pub struct ModifierPlugin;

impl ModifierPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl RenderPlugin for ModifierPlugin {
    fn name(&self) -> &str {
        "sourcefiles-modifier"
    }

    fn render(&self, input: InputMessage) -> OutputMessage {
        let files = &input.source_files;
        debug!(received = files.len(), "transforming working set");

        let mut plan = TransformPlan::new();
        let mut actions = Vec::new();

        for (index, file) in files.iter().enumerate() {
            match index {
                0 => {
                    plan = plan.delete(index);
                    actions.push(format!("REMOVED: {}", file.name));
                }
                1 => {
                    let content = format!("[MODIFIED BY PLUGIN 1]\n{}", file.text());
                    plan = plan.rewrite(index, content);
                    actions.push(format!("MODIFIED: {}", file.name));
                }
                2 => {
                    let stem = file.name.strip_suffix(".test").unwrap_or(&file.name);
                    let renamed = format!("{stem}.renamed");
                    actions.push(format!("RENAMED: {} -> {}", file.name, renamed));
                    plan = plan.rename(index, renamed);
                }
                _ => actions.push(format!("PASSED: {}", file.name)),
            }
        }

        let added = SourceFile::new(ADDED_NAME, ADDED_CONTENT);
        actions.push(format!("ADDED: {}", added.name));
        plan = plan.append(added);

        let next = plan.apply(files);
        debug!(emitted = next.len(), "working set replaced");

        let mut output = OutputMessage::default();
        output
            .rendered_files
            .insert(SUMMARY_NAME.into(), summary(&actions, files.len(), next.len()));
        output.modified_source_files = Some(next);
        output
    }
}

/// ConfigMap manifest documenting each action taken this invocation.
fn summary(actions: &[String], received: usize, emitted: usize) -> String {
    let mut listing = String::new();
    for action in actions {
        listing.push_str("    - ");
        listing.push_str(action);
        listing.push('\n');
    }
    format!(
        "# SourceFiles Modifier Plugin Summary\n\
         # This manifest documents the modifications made to source files\n\
         apiVersion: v1\n\
         kind: ConfigMap\n\
         metadata:\n\
         \x20 name: sourcefiles-modifier-summary\n\
         data:\n\
         \x20 actions: |\n\
         {listing}\
         \x20 filesReceived: \"{received}\"\n\
         \x20 filesOutput: \"{emitted}\"\n"
    )
}

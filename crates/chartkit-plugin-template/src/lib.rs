//! Two-pass template renderer plugin.
//!
//! Pass 1 registers every partial (base name starting with `_`) into a
//! shared namespace, in input order, last registration winning on
//! duplicate fragment names. Pass 2 compiles each primary file against an
//! execution-local view of the frozen namespace and renders it. Failures
//! are isolated per file: one broken template degrades the render, it
//! never blanks it.
//!
//! Output whose rendered text is entirely whitespace is treated as
//! "nothing to emit" and never appears in `renderedFiles`.

mod context;

use tracing::debug;

use chartkit_engine::{Namespace, NamespaceBuilder};
use chartkit_plugin::RenderPlugin;
use chartkit_types::{InputMessage, OutputMessage};

/// Extensions recognized as primary templates.
const TEMPLATE_EXTENSIONS: [&str; 4] = [".yaml", ".yml", ".tpl", ".txt"];

/// The template renderer plugin.
#[derive(Debug, Default)]
pub struct TemplatePlugin;

impl TemplatePlugin {
    pub fn new() -> Self {
        Self
    }
}

fn is_partial(name: &str) -> bool {
    name.rsplit('/').next().unwrap_or(name).starts_with('_')
}

fn is_primary(name: &str) -> bool {
    !is_partial(name) && TEMPLATE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

fn build_namespace(input: &InputMessage, output: &mut OutputMessage) -> Namespace {
    let mut builder = NamespaceBuilder::new();
    for file in &input.source_files {
        if !is_partial(&file.name) {
            continue;
        }
        debug!(file = %file.name, "registering partial");
        if let Err(err) = builder.register(&file.name, &file.text()) {
            output.push_error(err.to_string());
        }
    }
    builder.build()
}

impl RenderPlugin for TemplatePlugin {
    fn name(&self) -> &str {
        "template-render"
    }

    fn render(&self, input: InputMessage) -> OutputMessage {
        let mut output = OutputMessage::default();

        // Pass 1: the namespace is complete before any rendering starts.
        let namespace = build_namespace(&input, &mut output);
        debug!(fragments = namespace.len(), "namespace frozen");

        // Pass 2: independent per-file renders over the frozen namespace.
        for file in &input.source_files {
            if !is_primary(&file.name) {
                continue;
            }
            debug!(file = %file.name, "rendering template");
            let ctx = context::template_data(&input, &file.name);
            match namespace.render(&file.name, &file.text(), &ctx) {
                Ok(rendered) if rendered.trim().is_empty() => {
                    debug!(file = %file.name, "rendered output empty, skipping");
                }
                Ok(rendered) => {
                    output.rendered_files.insert(file.name.clone(), rendered);
                }
                Err(err) => output.push_error(err.to_string()),
            }
        }

        output
    }
}

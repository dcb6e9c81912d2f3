//! Variable-substitution renderer.
//!
//! A deliberately small renderer for `.pkl` sources: every `${dotted.path}`
//! token is replaced with the scalar found at that path in the invocation
//! data (`${release.name}`, `${values.image.tag}`, ...). Tokens that
//! resolve to nothing are left in place verbatim, so downstream tooling can
//! see exactly which substitution was missed. Output files keep their path
//! with the `.pkl` suffix swapped for `.yaml`.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use chartkit_plugin::RenderPlugin;
use chartkit_types::{InputMessage, OutputMessage};

const SOURCE_SUFFIX: &str = ".pkl";
const OUTPUT_SUFFIX: &str = ".yaml";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_][A-Za-z0-9_.\-]*)\}").unwrap())
}

/// The `${path}` substitution plugin.
#[derive(Debug, Default)]
pub struct VarsubstPlugin;

impl VarsubstPlugin {
    pub fn new() -> Self {
        Self
    }
}

/// Lowercase-keyed view of the invocation data that the dotted paths
/// resolve against.
fn substitution_data(input: &InputMessage) -> Value {
    serde_json::json!({
        "release": input.release,
        "chart": input.chart,
        "values": input.values,
        "capabilities": input.capabilities,
    })
}

/// Walk a dotted path through nested objects. Only scalar leaves
/// substitute; a structural or missing result is `None`.
fn resolve<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for key in path.split('.') {
        current = current.as_object()?.get(key)?;
    }
    match current {
        Value::Object(_) | Value::Array(_) => None,
        scalar => Some(scalar),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn substitute(content: &str, data: &Value) -> String {
    token_pattern()
        .replace_all(content, |caps: &Captures<'_>| match resolve(data, &caps[1]) {
            Some(value) => scalar_text(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

impl RenderPlugin for VarsubstPlugin {
    fn name(&self) -> &str {
        "varsubst-render"
    }

    fn render(&self, input: InputMessage) -> OutputMessage {
        let mut output = OutputMessage::default();
        let data = substitution_data(&input);

        for file in &input.source_files {
            let Some(stem) = file.name.strip_suffix(SOURCE_SUFFIX) else {
                continue;
            };
            debug!(file = %file.name, "substituting variables");
            let rendered = substitute(&file.text(), &data);
            output
                .rendered_files
                .insert(format!("{stem}{OUTPUT_SUFFIX}"), rendered);
        }

        output
    }
}

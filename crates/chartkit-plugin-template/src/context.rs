//! Render context assembly.
//!
//! Each primary file executes against one context value holding the full
//! input data plus that file's own identity. Top-level keys are
//! capitalized (`.Release`, `.Values`, `.Template`, …) to match what chart
//! templates have always written.

use serde_json::{Value, json};

use chartkit_types::InputMessage;

/// Build the per-file render context.
pub(crate) fn template_data(input: &InputMessage, file_name: &str) -> Value {
    let files: serde_json::Map<String, Value> = input
        .files
        .iter()
        .map(|f| (f.name.clone(), Value::String(f.text().into_owned())))
        .collect();

    json!({
        "Release": {
            "Name": input.release.name,
            "Namespace": input.release.namespace,
            "Revision": input.release.revision,
            "IsInstall": input.release.is_install,
            "IsUpgrade": input.release.is_upgrade,
            "Service": input.release.service,
        },
        "Values": input.values,
        "Chart": {
            "Name": input.chart.name,
            "Version": input.chart.version,
            "AppVersion": input.chart.app_version,
            "Description": input.chart.description,
            "Type": input.chart.kind,
            "IsRoot": input.chart.is_root,
        },
        "Subcharts": input.subcharts,
        // static assets as a plain name -> content mapping
        "Files": files,
        "Capabilities": {
            "KubeVersion": input.capabilities.kube_version,
            "APIVersions": input.capabilities.api_versions,
            "HelmVersion": input.capabilities.helm_version,
        },
        "Template": {
            "Name": file_name,
            "BasePath": base_path(file_name),
        },
    })
}

/// Directory component of a template path, or `"."` when there is none.
fn base_path(name: &str) -> &str {
    match name.rfind('/') {
        Some(0) => "/",
        Some(idx) => &name[..idx],
        None => ".",
    }
}

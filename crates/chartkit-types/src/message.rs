//! render/v1 message envelope types.
//!
//! Field names follow the camelCase wire contract. Every input field
//! tolerates absence and falls back to its zero value, so a host that
//! omits (say) `capabilities` still produces a decodable message.
//! `SourceFile::data` travels as a base64 string on the wire.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Release metadata passed to render plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseInfo {
    pub name: String,
    pub namespace: String,
    pub revision: i64,
    pub is_install: bool,
    pub is_upgrade: bool,
    pub service: String,
}

/// Chart metadata passed to render plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartInfo {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub is_root: bool,
}

/// Kubernetes cluster capabilities.
///
/// `kube_version` is kept structural: hosts have shipped it both as a
/// plain version string and as a `{version, major, minor}` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilitiesInfo {
    pub kube_version: serde_json::Value,
    #[serde(rename = "apiVersions")]
    pub api_versions: Vec<String>,
    pub helm_version: String,
}

/// One file in the chart's working set.
///
/// Files form an ordered sequence per message. Uniqueness of `name` within
/// one sequence is the producer's responsibility; the contract does not
/// enforce it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    #[serde(with = "base64_bytes", default)]
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// File content as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Final path component of `name`.
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Directory component of `name`, or `"."` when there is none.
    pub fn dir(&self) -> &str {
        match self.name.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.name[..idx],
            None => ".",
        }
    }
}

/// Serde helper encoding byte payloads as base64 strings, matching the
/// JSON byte-sequence encoding used by existing render/v1 hosts.
mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Input envelope for one render/v1 invocation.
///
/// All fields are immutable inputs; no state persists across invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputMessage {
    pub release: ReleaseInfo,
    /// Arbitrary nested chart values (mapping at the top level).
    pub values: serde_json::Map<String, serde_json::Value>,
    pub chart: ChartInfo,
    /// Subchart metadata keyed by subchart name.
    pub subcharts: serde_json::Map<String, serde_json::Value>,
    /// Non-template static assets.
    pub files: Vec<SourceFile>,
    pub capabilities: CapabilitiesInfo,
    /// The working template set for this invocation, in stage order.
    pub source_files: Vec<SourceFile>,
}

/// Output envelope for one render/v1 invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputMessage {
    /// Terminal output mapping; never re-enters the pipeline. A `BTreeMap`
    /// keeps the encoded envelope byte-stable. Last write wins on
    /// duplicate keys.
    pub rendered_files: BTreeMap<String, String>,
    /// Full replacement of the working set for the next stage.
    ///
    /// `None` means "no change requested"; `Some(vec![])` means "delete
    /// everything". The distinction is load-bearing, hence the `Option`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_source_files: Option<Vec<SourceFile>>,
    /// Accumulated per-file failures. Non-empty does not by itself abort
    /// the invocation; abort policy belongs to the host.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl OutputMessage {
    /// Envelope for a fatal failure: no rendered files, no source-file
    /// changes, exactly one error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            rendered_files: BTreeMap::new(),
            modified_source_files: None,
            errors: vec![message.into()],
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

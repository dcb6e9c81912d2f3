//! Wire types and message codec for render/v1 chart plugins.
//!
//! A render/v1 plugin is a single-invocation transformation unit: it
//! receives one [`InputMessage`] carrying a chart's template source tree
//! plus release/value context, and produces one [`OutputMessage`] carrying
//! rendered manifests and, optionally, a replacement source tree for the
//! next plugin in the chain.
//!
//! This crate defines the envelope types, the JSON codec at the plugin
//! boundary ([`decode`]/[`encode`]), and the codec error taxonomy. It holds
//! no rendering logic; see `chartkit-engine` for template compilation and
//! `chartkit-plugin` for the invocation contract.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode, encode};
pub use error::{DecodeError, EncodeError};
pub use message::{
    CapabilitiesInfo, ChartInfo, InputMessage, OutputMessage, ReleaseInfo, SourceFile,
};

//! Two-pass template engine for render/v1 chart plugins.
//!
//! The engine separates compilation into two phases:
//!
//! 1. **Partial registration.** Partial sources are offered to a mutable
//!    [`NamespaceBuilder`]; every top-level `{{ define "name" }}` block
//!    registers a named fragment. Registration is sequential and ordered,
//!    and a duplicate name overwrites the earlier body (last wins).
//! 2. **Primary rendering.** [`NamespaceBuilder::build`] freezes the
//!    fragments into an immutable, cheaply cloneable [`Namespace`]. Each
//!    primary file is compiled under its own name and executed against an
//!    execution-local view of that shared namespace, so one broken file
//!    never affects its siblings.
//!
//! The template language is a deliberately small pipeline dialect: literal
//! text interleaved with `{{ expression }}` actions, `{{-`/`-}}`
//! whitespace trimming, dot-paths into the render context, function calls,
//! and pipelines where the piped value becomes the final argument:
//!
//! ```text
//! name: {{ .Values.name | default .Release.Name | quote }}
//! data: {{- .Values.config | toYaml | nindent 2 }}
//! ```
//!
//! `include` and `tpl` re-enter the engine from inside a running template.
//! They are bound to the frozen namespace through the execution state, so
//! the read-only-after-build invariant holds even under recursion.
//!
//! Values flowing through templates are `serde_json::Value` -- a closed
//! tagged variant (null, bool, number, string, sequence, mapping) that
//! gives the function library exhaustive matching and deterministic
//! structural serialization.

pub mod error;
mod funcs;
mod lexer;
mod namespace;
mod parser;
mod render;

pub use error::{EngineError, ParseError, RenderError};
pub use namespace::{Namespace, NamespaceBuilder};

//! Engine error taxonomy.
//!
//! Both kinds are per-file: a failure in one template is recorded and the
//! remaining templates proceed. Fatal conditions (malformed envelope,
//! unserializable response) live in `chartkit-types`.

use thiserror::Error;

/// A template source failed to parse.
#[derive(Debug, Error)]
#[error("parse error in {name}: {message}")]
pub struct ParseError {
    /// Name the source was compiled under, usually its file path.
    pub name: String,
    pub message: String,
}

/// A compiled template failed during execution, for example a `required`
/// trip or a call to an unknown function.
#[derive(Debug, Error)]
#[error("render error in {name}: {message}")]
pub struct RenderError {
    pub name: String,
    pub message: String,
}

/// Either phase of compiling and executing a single file.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

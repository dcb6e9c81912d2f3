//! Two-phase fragment namespace.
//!
//! [`NamespaceBuilder`] is the mutable Pass 1 surface: partial sources are
//! registered sequentially, in input order. [`NamespaceBuilder::build`] is
//! the completion barrier -- it freezes the fragments into an immutable
//! [`Namespace`] before any primary execution can begin, so no render ever
//! observes a partially populated namespace.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{EngineError, ParseError, RenderError};
use crate::parser::{self, Node};
use crate::render::Exec;

/// Mutable Pass 1 registration surface.
#[derive(Debug, Default)]
pub struct NamespaceBuilder {
    fragments: HashMap<String, Arc<Vec<Node>>>,
}

impl NamespaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one partial source compiled under `name` and register every
    /// top-level `{{ define "…" }}` block.
    ///
    /// A duplicate fragment name overwrites the earlier body: last
    /// registration wins. That tie-break is engine-compatibility looseness
    /// and is relied upon by charts that shadow library fragments.
    ///
    /// Text outside define blocks is parsed for errors but never rendered;
    /// partials themselves produce no output.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), ParseError> {
        let nodes = parser::parse(source).map_err(|message| ParseError {
            name: name.to_string(),
            message,
        })?;
        for node in nodes {
            if let Node::Define { name, body } = node {
                self.fragments.insert(name, body);
            }
        }
        Ok(())
    }

    /// Freeze the registered fragments into an immutable namespace.
    pub fn build(self) -> Namespace {
        Namespace {
            fragments: Arc::new(self.fragments),
        }
    }
}

/// Immutable, cheaply cloneable set of shared fragments.
///
/// Every primary render works against an execution-local view of this
/// structure; cloning the namespace clones an `Arc`, not the fragments.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    fragments: Arc<HashMap<String, Arc<Vec<Node>>>>,
}

impl Namespace {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// Compile `source` under `name` and execute it against `ctx`.
    ///
    /// Failure is per file: a [`ParseError`] or [`RenderError`] here says
    /// nothing about any other source compiled against this namespace.
    pub fn render(&self, name: &str, source: &str, ctx: &Value) -> Result<String, EngineError> {
        let nodes = parser::parse(source).map_err(|message| ParseError {
            name: name.to_string(),
            message,
        })?;

        // Define blocks inside a primary file shadow the shared fragments
        // for this file only.
        let mut locals: HashMap<String, Arc<Vec<Node>>> = HashMap::new();
        for node in &nodes {
            if let Node::Define { name, body } = node {
                locals.insert(name.clone(), Arc::clone(body));
            }
        }

        let exec = Exec::new(self, &locals);
        let mut out = String::new();
        exec.render_body(&nodes, ctx, &mut out)
            .map_err(|message| RenderError {
                name: name.to_string(),
                message,
            })?;
        Ok(out)
    }

    pub(crate) fn fragment(&self, name: &str) -> Option<&Arc<Vec<Node>>> {
        self.fragments.get(name)
    }
}

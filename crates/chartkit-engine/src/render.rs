//! Template execution.
//!
//! [`Exec`] is the execution-local view each primary file renders
//! through: a borrow of the frozen namespace plus this file's local
//! definitions and the current re-entry depth. It is `Copy`, so
//! `include`/`tpl` re-enter by deriving a deeper copy rather than touching
//! any shared mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::funcs;
use crate::namespace::Namespace;
use crate::parser::{self, Expr, Node};

/// Hard cap on `include`/`tpl` re-entry depth. Exceeding it fails the
/// current file only.
pub(crate) const MAX_DEPTH: usize = 64;

/// Execution-local view over a frozen [`Namespace`].
#[derive(Clone, Copy)]
pub(crate) struct Exec<'a> {
    ns: &'a Namespace,
    locals: &'a HashMap<String, Arc<Vec<Node>>>,
    depth: usize,
}

impl<'a> Exec<'a> {
    pub(crate) fn new(ns: &'a Namespace, locals: &'a HashMap<String, Arc<Vec<Node>>>) -> Self {
        Self {
            ns,
            locals,
            depth: 0,
        }
    }

    pub(crate) fn render_body(
        &self,
        nodes: &[Node],
        ctx: &Value,
        out: &mut String,
    ) -> Result<(), String> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                // already registered; renders to nothing in place
                Node::Define { .. } => {}
                Node::Output(expr) => {
                    let value = self.eval(expr, ctx)?;
                    out.push_str(&stringify(&value));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn eval(&self, expr: &Expr, ctx: &Value) -> Result<Value, String> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Number(n) => Ok(Value::Number(n.clone())),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Path(path) => Ok(lookup(ctx, path)),
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, ctx)?);
                }
                let func =
                    funcs::lookup(name).ok_or_else(|| format!("unknown function {name:?}"))?;
                func(self, &values)
            }
        }
    }

    /// Render a registered fragment with `data` as its context. This
    /// file's local definitions shadow the shared namespace.
    pub(crate) fn include(&self, name: &str, data: &Value) -> Result<String, String> {
        let body = self
            .locals
            .get(name)
            .or_else(|| self.ns.fragment(name))
            .ok_or_else(|| format!("no fragment named {name:?}"))?;
        let deeper = self.deeper()?;
        let mut out = String::new();
        deeper.render_body(body, data, &mut out)?;
        Ok(out)
    }

    /// Compile a raw template string and render it against `data`, inside
    /// the same namespace.
    pub(crate) fn template_str(&self, raw: &str, data: &Value) -> Result<String, String> {
        let nodes = parser::parse(raw).map_err(|message| format!("tpl: {message}"))?;
        let deeper = self.deeper()?;
        let mut out = String::new();
        deeper.render_body(&nodes, data, &mut out)?;
        Ok(out)
    }

    fn deeper(&self) -> Result<Self, String> {
        if self.depth >= MAX_DEPTH {
            return Err(format!("template recursion exceeded {MAX_DEPTH} levels"));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

fn lookup(ctx: &Value, path: &[String]) -> Value {
    let mut current = ctx;
    for key in path {
        match current {
            Value::Object(map) => match map.get(key) {
                Some(next) => current = next,
                None => return Value::Null,
            },
            _ => return Value::Null,
        }
    }
    current.clone()
}

/// How a value prints when interpolated into output: nil prints as
/// nothing, scalars print bare, structured values print as compact JSON.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

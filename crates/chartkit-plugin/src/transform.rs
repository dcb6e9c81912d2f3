//! Source-file transform stage.
//!
//! A transform computes the next working file set from the received one.
//! The result is a full authoritative replacement: files not emitted are
//! deleted, files appended become visible to the next stage, order is
//! preserved otherwise. Application never mutates its input and holds no
//! state between invocations.

use std::collections::HashMap;

use chartkit_types::SourceFile;

/// What happens to the file at one position of the received sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    /// Pass through unchanged (the default for unplanned positions).
    Keep,
    /// Drop the file by omitting it from the replacement sequence.
    Delete,
    /// Replace the content; the name is preserved.
    Rewrite(Vec<u8>),
    /// Replace the name; the bytes are preserved.
    Rename(String),
}

/// An ordered plan over the received working set, indexed by position.
///
/// Positions without an op pass through; ops planned for positions beyond
/// the received sequence are ignored. Appended files always land at the
/// end, after every surviving input file, in append order.
#[derive(Debug, Clone, Default)]
pub struct TransformPlan {
    ops: HashMap<usize, FileOp>,
    appends: Vec<SourceFile>,
}

impl TransformPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(mut self, index: usize) -> Self {
        self.ops.insert(index, FileOp::Delete);
        self
    }

    pub fn rewrite(mut self, index: usize, data: impl Into<Vec<u8>>) -> Self {
        self.ops.insert(index, FileOp::Rewrite(data.into()));
        self
    }

    pub fn rename(mut self, index: usize, name: impl Into<String>) -> Self {
        self.ops.insert(index, FileOp::Rename(name.into()));
        self
    }

    pub fn append(mut self, file: SourceFile) -> Self {
        self.appends.push(file);
        self
    }

    /// Apply the plan, producing the full replacement sequence.
    pub fn apply(&self, files: &[SourceFile]) -> Vec<SourceFile> {
        let mut next = Vec::with_capacity(files.len() + self.appends.len());
        for (index, file) in files.iter().enumerate() {
            match self.ops.get(&index).unwrap_or(&FileOp::Keep) {
                FileOp::Keep => next.push(file.clone()),
                FileOp::Delete => {}
                FileOp::Rewrite(data) => {
                    next.push(SourceFile::new(file.name.clone(), data.clone()));
                }
                FileOp::Rename(name) => {
                    next.push(SourceFile::new(name.clone(), file.data.clone()));
                }
            }
        }
        next.extend(self.appends.iter().cloned());
        next
    }
}

//! render/v1 plugin contract.
//!
//! A render plugin is one synchronous transformation: [`InputMessage`] in,
//! [`OutputMessage`] out, nothing carried across invocations. This crate
//! defines that contract and the machinery around it:
//!
//! - [`RenderPlugin`] -- the trait a plugin implements.
//! - [`invoke`] -- the byte-level harness: decode, render, encode, and the
//!   status convention (`0` success, non-zero fatal). The harness never
//!   panics across the host boundary; every failure becomes an `errors`
//!   entry plus a status code.
//! - [`TransformPlan`] -- a toolkit for the source-file transform stage:
//!   delete/rewrite/rename/pass-through/append over the received working
//!   set, producing the full replacement sequence for the next stage.
//!
//! The Wasm export itself (reading the request, writing the response) is
//! the embedding host's concern and deliberately absent here; plugins stay
//! plain Rust values that the host wires to its ABI.
//!
//! [`InputMessage`]: chartkit_types::InputMessage
//! [`OutputMessage`]: chartkit_types::OutputMessage

pub mod invoke;
pub mod traits;
pub mod transform;

pub use invoke::{Invocation, STATUS_FATAL, STATUS_OK, invoke};
pub use traits::RenderPlugin;
pub use transform::TransformPlan;

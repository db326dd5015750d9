//! Process runtime and the single-operation lifecycle.
//!
//! - [`GleanRuntime`]: Tokio runtime builder used by the binary
//! - [`lifecycle`]: [`lifecycle::OperationGate`] (one operation at a time,
//!   released on every exit path) and [`lifecycle::StatusBoard`]

pub mod lifecycle;
mod runtime;

pub use lifecycle::{OperationGate, OperationToken, StatusBoard};
pub use runtime::GleanRuntime;

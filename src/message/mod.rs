//! Message header model.

pub mod headers;

pub use headers::{MessageHeaders, MessageSummary};

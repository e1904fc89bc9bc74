//! Analyst service module
//!
//! Message and content-block types exchanged with the Cortex Analyst
//! endpoint, and the HTTP client that talks to it.

pub mod client;
pub mod types;

pub use client::{Analyst, AnalystExchange, AnalystReply, CortexAnalystClient};
pub use types::{ContentBlock, Message, Role, SemanticModelRef};

//! HTTP client for the remote coding agent API.
//!
//! Provides:
//! - `HttpAgentClient` - `reqwest`-based implementation of `AgentApi`
//! - Wire payload types for the three remote operations

pub mod http;
pub mod wire;

pub use http::HttpAgentClient;

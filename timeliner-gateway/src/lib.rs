//! Timeliner Gateway - document persistence backends.
//!
//! - [`Gateway`]: the remote document store contract
//! - [`HttpGateway`]: the REST backend
//! - [`MemoryGateway`]: an in-process store for tests and offline demos
//! - [`RemoteSink`]: debounced saves against a gateway
//! - [`Library`]: the document lifecycle (startup, open, new, rename,
//!   delete, import)

mod error;
mod gateway;
mod http;
mod library;
mod memory;
mod sink;

pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use http::HttpGateway;
pub use library::Library;
pub use memory::MemoryGateway;
pub use sink::RemoteSink;

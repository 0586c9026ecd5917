pub mod client;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod retry;
pub mod transport;

//! Model Context Protocol surface: JSON-RPC types, the tool catalog and
//! the request handler shared by both transports.

pub mod catalog;
pub mod protocol;
mod server;
pub mod tools;

pub use server::{McpServer, SERVER_NAME};

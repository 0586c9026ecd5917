pub mod http;
pub mod stdio;

pub use http::run_http;
pub use stdio::run_stdio;

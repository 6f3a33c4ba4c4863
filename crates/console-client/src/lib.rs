pub mod config;
pub mod http;
pub mod ws;

pub use config::Endpoints;
pub use http::HttpControl;
pub use ws::WsStream;

// Transport module

pub mod models;
pub mod services;

pub use models::{HttpMethod, HttpRequest, TlsOptions};
pub use services::{ReqwestTransport, Transport};

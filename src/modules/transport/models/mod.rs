pub mod http_request;

pub use http_request::{HttpMethod, HttpRequest, TlsOptions};

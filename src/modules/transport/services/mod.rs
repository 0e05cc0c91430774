pub mod reqwest_transport;
pub mod transport_trait;

pub use reqwest_transport::ReqwestTransport;
pub use transport_trait::Transport;

pub mod envelope;
pub mod gateways;
pub mod signing;
pub mod transport;

pub mod error;
pub mod nonce;
pub mod params;
pub mod telemetry;
pub mod timezone;

pub use error::{AppError, ErrorKind, Result};
pub use params::{ParamValue, ParameterSet};
pub use timezone::GatewayClock;

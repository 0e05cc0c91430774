pub mod result_envelope;

pub use result_envelope::{ResultEnvelope, SuccessRule};

// Envelope module: response normalization and wire codecs

pub mod models;
pub mod services;

pub use models::{ResultEnvelope, SuccessRule};
pub use services::{decode, encode_form, encode_xml, WireFormat};

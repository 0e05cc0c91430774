pub mod signature_engine;

pub use signature_engine::SignatureEngine;

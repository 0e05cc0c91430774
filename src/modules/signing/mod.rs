// Signing module

pub mod models;
pub mod services;

pub use models::{DigestKind, HexCase, SecretPlacement, SigningRules};
pub use services::SignatureEngine;

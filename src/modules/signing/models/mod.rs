pub mod signing_rules;

pub use signing_rules::{DigestKind, HexCase, SecretPlacement, SigningRules};

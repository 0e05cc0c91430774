// Shared fixtures for the test binaries.
//
// Usage:
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;
#![allow(dead_code)]

pub mod recording_transport;

pub use recording_transport::*;
pub use test_data::*;

pub mod call_options;
pub mod gateway_profile;
pub mod operation;

pub use call_options::{CallOptions, Completed, CompletionHook};
pub use gateway_profile::GatewayProfile;
pub use operation::{AccountFields, OperationSpec};

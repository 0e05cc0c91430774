use uuid::Uuid;

/// Fresh single-use token: 32 lowercase hex characters, no dashes.
///
/// Every request gets its own, so concurrent calls never share a
/// gateway-side idempotency key.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

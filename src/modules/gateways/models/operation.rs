/// Request fields filled from the configured account ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFields {
    /// Receives `Credentials::account_id`
    pub primary: Option<&'static str>,
    /// Receives `Credentials::secondary_account_id`, when one is configured
    pub secondary: Option<&'static str>,
}

impl AccountFields {
    pub const NONE: AccountFields = AccountFields {
        primary: None,
        secondary: None,
    };

    pub const fn primary(field: &'static str) -> Self {
        Self {
            primary: Some(field),
            secondary: None,
        }
    }

    pub const fn both(primary: &'static str, secondary: &'static str) -> Self {
        Self {
            primary: Some(primary),
            secondary: Some(secondary),
        }
    }
}

/// Static description of one gateway call.
///
/// Built with const builder methods so each client can keep its operation
/// table in `static` items.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    /// Appended to the gateway base url
    pub path: &'static str,
    /// Every field must be present after defaults and caller fields are merged
    pub required: &'static [&'static str],
    /// At least one field of each group must be present
    pub one_of: &'static [&'static [&'static str]],
    /// Mutual TLS with the configured client certificate
    pub requires_certificate: bool,
    pub account_fields: AccountFields,
    /// `(target, source)`: copy `source` into `target` when the caller left `target` out
    pub derived: &'static [(&'static str, &'static str)],
    /// Constant fields the caller may still override
    pub fixed: &'static [(&'static str, &'static str)],
    /// Whether the gateway's nonce field is generated for this call
    pub nonce: bool,
}

impl OperationSpec {
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            required: &[],
            one_of: &[],
            requires_certificate: false,
            account_fields: AccountFields::NONE,
            derived: &[],
            fixed: &[],
            nonce: true,
        }
    }

    pub const fn required(mut self, fields: &'static [&'static str]) -> Self {
        self.required = fields;
        self
    }

    pub const fn one_of(mut self, groups: &'static [&'static [&'static str]]) -> Self {
        self.one_of = groups;
        self
    }

    pub const fn with_certificate(mut self) -> Self {
        self.requires_certificate = true;
        self
    }

    pub const fn accounts(mut self, fields: AccountFields) -> Self {
        self.account_fields = fields;
        self
    }

    pub const fn derived(mut self, pairs: &'static [(&'static str, &'static str)]) -> Self {
        self.derived = pairs;
        self
    }

    /// Client-side payloads carry the caller's own nonce fields
    pub const fn without_nonce(mut self) -> Self {
        self.nonce = false;
        self
    }

    pub const fn fixed(mut self, pairs: &'static [(&'static str, &'static str)]) -> Self {
        self.fixed = pairs;
        self
    }
}

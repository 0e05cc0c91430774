use crate::core::{ParamValue, ParameterSet};
use serde_json::{Map, Value};

/// Gateway-specific definition of a successful answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessRule {
    /// Every listed field is present and equals its literal
    FieldsEqual(&'static [(&'static str, &'static str)]),
    /// The named error-code field is absent or zero
    NoErrorCode(&'static str),
}

/// Read-only view over a normalized gateway response
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    gateway: &'static str,
    fields: Map<String, Value>,
    rule: SuccessRule,
}

impl ResultEnvelope {
    pub fn new(gateway: &'static str, fields: Map<String, Value>, rule: SuccessRule) -> Self {
        Self {
            gateway,
            fields,
            rule,
        }
    }

    pub fn gateway(&self) -> &'static str {
        self.gateway
    }

    /// Raw value of a field; `None` when absent
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field as a string slice; `None` when absent or not a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Field rendered as text when it is a scalar (string, number, bool)
    pub fn field_text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Signature the gateway attached under `field`, if any
    pub fn signature(&self, field: &str) -> Option<&str> {
        self.field_str(field).filter(|s| !s.is_empty())
    }

    pub fn is_success(&self) -> bool {
        match self.rule {
            SuccessRule::FieldsEqual(pairs) => pairs
                .iter()
                .all(|(name, expected)| self.field_text(name).as_deref() == Some(*expected)),
            SuccessRule::NoErrorCode(name) => match self.fields.get(name) {
                None | Some(Value::Null) => true,
                Some(Value::Number(n)) => n.as_i64() == Some(0),
                Some(Value::String(s)) => s == "0",
                Some(_) => false,
            },
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    /// Top-level scalar fields as a parameter set, for signature checks.
    /// Nested objects and arrays are left out.
    pub fn to_parameter_set(&self) -> ParameterSet {
        self.fields
            .iter()
            .filter_map(|(k, v)| {
                let value = match v {
                    Value::String(s) => ParamValue::Text(s.clone()),
                    Value::Number(n) => match n.as_i64() {
                        Some(i) => ParamValue::Integer(i),
                        None => ParamValue::Text(n.to_string()),
                    },
                    Value::Bool(b) => ParamValue::Bool(*b),
                    _ => return None,
                };
                Some((k.clone(), value))
            })
            .collect()
    }
}

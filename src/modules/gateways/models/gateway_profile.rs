use crate::modules::envelope::{SuccessRule, WireFormat};
use crate::modules::signing::{DigestKind, HexCase, SecretPlacement, SigningRules};

/// Everything that varies between gateways apart from the operation list
#[derive(Debug)]
pub struct GatewayProfile {
    pub name: &'static str,
    pub signing: SigningRules,
    /// Field receiving a fresh random nonce on every request, if the gateway has one
    pub nonce_field: Option<&'static str>,
    pub wire_format: WireFormat,
    pub success_rule: SuccessRule,
    /// Whether the gateway signs its responses with the shared secret
    pub signs_responses: bool,
}

/// Wallet gateway: XML over HTTPS, `&key=` suffix, uppercase hex
pub static WECHAT: GatewayProfile = GatewayProfile {
    name: "wechat",
    signing: SigningRules {
        signature_field: "sign",
        secret_field: "key",
        excluded_fields: &[],
        secret_placement: SecretPlacement::KeyValueSuffix("key"),
        hex_case: HexCase::Upper,
        default_digest: DigestKind::Md5,
        sign_type_field: Some("sign_type"),
    },
    nonce_field: Some("nonce_str"),
    wire_format: WireFormat::Xml { root: "xml" },
    success_rule: SuccessRule::FieldsEqual(&[("return_code", "SUCCESS"), ("result_code", "SUCCESS")]),
    signs_responses: true,
};

/// Bank-card gateway
pub static SHENGPAY: GatewayProfile = GatewayProfile {
    name: "shengpay",
    signing: SigningRules {
        signature_field: "SignMsg",
        secret_field: "key",
        excluded_fields: &[],
        secret_placement: SecretPlacement::KeyValueSuffix("key"),
        hex_case: HexCase::Upper,
        default_digest: DigestKind::Md5,
        sign_type_field: Some("SignType"),
    },
    nonce_field: Some("Nonce"),
    wire_format: WireFormat::Xml { root: "request" },
    success_rule: SuccessRule::FieldsEqual(&[("ReturnCode", "0000"), ("ResultCode", "0000")]),
    signs_responses: true,
};

/// Mobile-wallet gateway: form-encoded, secret appended bare, lowercase hex
pub static ALIPAY: GatewayProfile = GatewayProfile {
    name: "alipay",
    signing: SigningRules {
        signature_field: "sign",
        secret_field: "key",
        excluded_fields: &["sign_type"],
        secret_placement: SecretPlacement::Appended,
        hex_case: HexCase::Lower,
        default_digest: DigestKind::Md5,
        sign_type_field: None,
    },
    nonce_field: None,
    wire_format: WireFormat::Form,
    success_rule: SuccessRule::FieldsEqual(&[("is_success", "T")]),
    signs_responses: false,
};

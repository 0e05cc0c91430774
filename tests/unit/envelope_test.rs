// Response normalization: decoding gateway bodies into envelopes

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use paybridge::modules::envelope::{decode, ResultEnvelope, SuccessRule};
use paybridge::modules::gateways::gateway_profile::{ALIPAY, SHENGPAY, WECHAT};
use paybridge::{AppError, SignatureEngine};
use serde_json::{json, Map, Value};

fn envelope_from(value: Value, rule: SuccessRule) -> ResultEnvelope {
    let fields: Map<String, Value> = serde_json::from_value(value).unwrap();
    ResultEnvelope::new("test", fields, rule)
}

#[test]
fn test_success_flag_follows_both_codes() {
    let ok = envelope_from(json!({"return_code": "SUCCESS", "result_code": "SUCCESS"}), WECHAT.success_rule);
    assert!(ok.is_success());

    let failed = envelope_from(json!({"return_code": "FAIL"}), WECHAT.success_rule);
    assert!(!failed.is_success());
    assert_eq!(failed.field("result_code"), None);
}

#[test]
fn test_wallet_response_with_cdata() {
    let body = "<xml>\n  <return_code><![CDATA[SUCCESS]]></return_code>\n  \
                <return_msg><![CDATA[OK]]></return_msg>\n  \
                <result_code><![CDATA[SUCCESS]]></result_code>\n  \
                <prepay_id><![CDATA[wx201410272009395522657a690389285100]]></prepay_id>\n</xml>";
    let envelope = ResultEnvelope::new("wechat", decode(body).unwrap(), WECHAT.success_rule);

    assert!(envelope.is_success());
    assert_eq!(
        envelope.field_str("prepay_id"),
        Some("wx201410272009395522657a690389285100")
    );
}

#[test]
fn test_signed_response_fields_verify() {
    let body = TestDataFactory::signed_wechat_xml(
        &[("return_code", "SUCCESS"), ("result_code", "SUCCESS"), ("openid", "o1")],
        WECHAT_KEY,
    );
    let envelope = ResultEnvelope::new("wechat", decode(&body).unwrap(), WECHAT.success_rule);
    let engine = SignatureEngine::new(&WECHAT.signing);

    let claimed = envelope.field_str("sign").unwrap();
    assert!(engine.verify(
        &envelope.to_parameter_set(),
        claimed,
        &TestDataFactory::secret(WECHAT_KEY)
    ));
}

#[test]
fn test_bank_card_response_codes() {
    let body = TestDataFactory::unsigned_xml(
        "response",
        &[("ReturnCode", "0000"), ("ResultCode", "0001"), ("ReturnMessage", "declined")],
    );
    let envelope = ResultEnvelope::new("shengpay", decode(&body).unwrap(), SHENGPAY.success_rule);
    assert!(!envelope.is_success());
    assert_eq!(envelope.field_text("ReturnMessage").as_deref(), Some("declined"));
}

#[test]
fn test_mobile_wallet_nested_response() {
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
                <alipay><is_success>T</is_success>\
                <request><param name=\"service\">single_trade_query</param></request>\
                <response><trade><trade_no>2014</trade_no><trade_status>TRADE_SUCCESS</trade_status></trade></response>\
                <sign>abc</sign><sign_type>MD5</sign_type></alipay>";
    let envelope = ResultEnvelope::new("alipay", decode(body).unwrap(), ALIPAY.success_rule);

    assert!(envelope.is_success());
    assert_eq!(
        envelope.field("response"),
        Some(&json!({"trade": {"trade_no": "2014", "trade_status": "TRADE_SUCCESS"}}))
    );
    assert!(!envelope.to_parameter_set().contains("response"));
}

#[test]
fn test_json_oauth_error() {
    let envelope = ResultEnvelope::new(
        "wechat",
        decode(r#"{"errcode":40029,"errmsg":"invalid code"}"#).unwrap(),
        SuccessRule::NoErrorCode("errcode"),
    );
    assert!(!envelope.is_success());
    assert_eq!(envelope.field_text("errcode").as_deref(), Some("40029"));
}

#[test]
fn test_malformed_body_is_parse_error() {
    assert!(matches!(decode("<xml><a>1</b></xml>"), Err(AppError::ResponseParse(_))));
    assert!(matches!(decode("{not json"), Err(AppError::ResponseParse(_))));
}

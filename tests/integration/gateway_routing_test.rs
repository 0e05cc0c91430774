// Routing order calls by gateway name through GatewayService

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use paybridge::config::Config;
use paybridge::modules::gateways::gateway_profile::WECHAT;
use paybridge::modules::gateways::OrderAction;
use paybridge::{AppError, CallOptions, GatewayService, ParameterSet, SignatureEngine};
use std::sync::Arc;

fn service(transport: &RecordingTransport) -> GatewayService {
    TestDataFactory::init_tracing();
    let config = Config {
        wechat: Some(TestDataFactory::wechat_config("https://api.mch.test")),
        shengpay: Some(TestDataFactory::shengpay_config("https://mas.test")),
        alipay: Some(TestDataFactory::alipay_config("https://mapi.test/")),
        ..Config::default()
    };
    GatewayService::from_config(&config, Arc::new(transport.clone()))
}

#[tokio::test]
async fn test_create_order_routes_to_each_gateway() {
    let transport = RecordingTransport::succeeding();
    let service = service(&transport);

    service
        .create_order("wechat", TestDataFactory::unified_order_params(), CallOptions::new())
        .await
        .unwrap();
    service
        .create_order(
            "shengpay",
            ParameterSet::from([
                ("OrderNo", "S1"),
                ("OrderAmount", "1.00"),
                ("Currency", "CNY"),
                ("PageUrl", "https://shop.test/p"),
                ("NotifyUrl", "https://shop.test/n"),
                ("BuyerIp", "1.2.3.4"),
            ]),
            CallOptions::new(),
        )
        .await
        .unwrap();
    service
        .create_order(
            "alipay",
            ParameterSet::from([
                ("out_trade_no", "A1"),
                ("subject", "tea"),
                ("total_fee", "0.01"),
                ("notify_url", "https://shop.test/n"),
            ]),
            CallOptions::new(),
        )
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].url, "https://api.mch.test/pay/unifiedorder");
    assert_eq!(requests[0].header("content-type"), Some("application/xml"));

    let shengpay_body = requests[1].body.as_deref().unwrap();
    assert!(requests[1].url.starts_with("https://mas.test/"));
    assert!(shengpay_body.starts_with("<request>"));
    assert!(shengpay_body.contains("<MsgSender>100894</MsgSender>"));
    assert!(shengpay_body.contains("<SignMsg>"));
    assert!(shengpay_body.contains("<OrderTime>"));

    assert_eq!(requests[2].url, "https://mapi.test/gateway.do");
    assert_eq!(
        requests[2].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    let alipay_body = requests[2].body.as_deref().unwrap();
    assert!(alipay_body.contains("service=alipay.acquire.precreate"));
    assert!(alipay_body.contains("partner=2088101122136241"));
    assert!(alipay_body.contains("&sign="));
}

#[tokio::test]
async fn test_query_and_close_dispatch() {
    let transport = RecordingTransport::succeeding();
    let service = service(&transport);

    let query = service
        .dispatch(
            "wechat",
            OrderAction::Query,
            ParameterSet::from([("transaction_id", "42")]),
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert!(query.is_success());

    service
        .close_order("alipay", ParameterSet::from([("trade_no", "2014")]), CallOptions::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert!(requests[0].url.ends_with("/pay/orderquery"));
    assert!(requests[1].body.as_deref().unwrap().contains("service=close_trade"));
}

#[tokio::test]
async fn test_unknown_gateway_is_configuration_error() {
    let transport = RecordingTransport::succeeding();
    let service = service(&transport);

    let err = service
        .query_order("paypal", ParameterSet::new(), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_validation_error_is_not_sent() {
    let transport = RecordingTransport::succeeding();
    let service = service(&transport);

    let err = service
        .query_order("alipay", ParameterSet::new(), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_notification_verification() {
    let transport = RecordingTransport::succeeding();
    let service = service(&transport);

    let engine = SignatureEngine::new(&WECHAT.signing);
    let mut notification = ParameterSet::from([
        ("appid", WECHAT_APP_ID),
        ("out_trade_no", "T1"),
        ("result_code", "SUCCESS"),
        ("total_fee", "100"),
    ]);
    engine
        .sign_in_place(&mut notification, &TestDataFactory::secret(WECHAT_KEY))
        .unwrap();

    assert!(service.verify_notification("wechat", &notification).unwrap());

    notification.insert("total_fee", "1");
    assert!(!service.verify_notification("wechat", &notification).unwrap());
    assert!(service.verify_notification("stripe", &notification).is_err());
}

#[test]
fn test_list_gateways() {
    let transport = RecordingTransport::succeeding();
    let gateways = service(&transport).list_gateways();

    let names: Vec<&str> = gateways.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["alipay", "shengpay", "wechat"]);

    let alipay = &gateways[0];
    assert_eq!(alipay.wire_format, "form");
    assert!(!alipay.signs_responses);
    assert_eq!(gateways[1].signature_field, "SignMsg");
}

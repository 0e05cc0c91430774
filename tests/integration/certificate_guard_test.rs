// Certificate-bound operations never reach the network without client certificate material

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use paybridge::config::{ClientConfig, Config};
use paybridge::{
    AlipayClient, AppError, CallOptions, ClientCertificate, ParameterSet, ShengpayClient,
    WechatPayClient,
};
use std::collections::HashMap;
use std::sync::Arc;

fn wechat(transport: &RecordingTransport) -> WechatPayClient {
    TestDataFactory::init_tracing();
    WechatPayClient::new(
        TestDataFactory::wechat_config("https://api.mch.test"),
        ClientConfig::default(),
        Arc::new(transport.clone()),
    )
}

fn refund_params() -> ParameterSet {
    ParameterSet::from([
        ("out_trade_no", "T1"),
        ("out_refund_no", "R1"),
        ("total_fee", "100"),
        ("refund_fee", "100"),
    ])
}

#[tokio::test]
async fn test_wallet_refund_without_certificate_never_sends() {
    let transport = RecordingTransport::succeeding();
    let client = wechat(&transport);

    let err = client.refund(refund_params(), CallOptions::new()).await.unwrap_err();

    assert!(matches!(err, AppError::Configuration(_)));
    assert!(err.is_setup_error());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_every_wallet_certificate_operation_is_guarded() {
    let transport = RecordingTransport::succeeding();
    let client = wechat(&transport);

    let results = vec![
        client.reverse(ParameterSet::from([("out_trade_no", "T1")]), CallOptions::new()).await,
        client.transfer(ParameterSet::new(), CallOptions::new()).await,
        client.transfer_info(ParameterSet::new(), CallOptions::new()).await,
        client.send_redpack(ParameterSet::new(), CallOptions::new()).await,
        client.send_group_redpack(ParameterSet::new(), CallOptions::new()).await,
    ];

    for result in results {
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_certificate_guard_precedes_field_validation() {
    let transport = RecordingTransport::succeeding();
    let client = wechat(&transport);

    // Required fields are missing too; the certificate error is reported first
    let err = client
        .refund(ParameterSet::new(), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
}

#[tokio::test]
async fn test_per_call_certificate_is_attached() {
    let transport = RecordingTransport::succeeding();
    let client = wechat(&transport);

    let options = CallOptions::new().certificate(TestDataFactory::test_certificate());
    let envelope = client.refund(refund_params(), options).await.unwrap();
    assert!(envelope.is_success());

    let request = transport.last_request().unwrap();
    assert!(request.url.ends_with("/secapi/pay/refund"));
    assert!(request.tls.client_certificate.is_some());
    assert!(request.tls.verify_server_cert);
    assert!(request
        .body
        .as_deref()
        .unwrap()
        .contains(&format!("<op_user_id>{}</op_user_id>", WECHAT_MCH_ID)));
}

#[tokio::test]
async fn test_configured_certificate_and_relaxed_verification() {
    let transport = RecordingTransport::succeeding();
    let mut config = TestDataFactory::wechat_config("https://api.mch.test");
    config.credentials = config
        .credentials
        .with_certificate(TestDataFactory::test_certificate());
    let client = WechatPayClient::new(config, ClientConfig::default(), Arc::new(transport.clone()));

    let options = CallOptions::new().verify_server_cert(false);
    client.refund(refund_params(), options).await.unwrap();

    let request = transport.last_request().unwrap();
    assert!(request.tls.client_certificate.is_some());
    assert!(!request.tls.verify_server_cert);
}

#[tokio::test]
async fn test_plain_operations_do_not_present_certificate() {
    let transport = RecordingTransport::succeeding();
    let mut config = TestDataFactory::wechat_config("https://api.mch.test");
    config.credentials = config
        .credentials
        .with_certificate(TestDataFactory::test_certificate());
    let client = WechatPayClient::new(config, ClientConfig::default(), Arc::new(transport.clone()));

    client
        .order_query(ParameterSet::from([("out_trade_no", "T1")]), CallOptions::new())
        .await
        .unwrap();

    assert!(transport.last_request().unwrap().tls.client_certificate.is_none());
}

#[tokio::test]
async fn test_bank_card_and_mobile_wallet_refunds_are_guarded() {
    let transport = RecordingTransport::new("<response><ReturnCode>0000</ReturnCode></response>");
    let shengpay = ShengpayClient::new(
        TestDataFactory::shengpay_config("https://mas.test"),
        ClientConfig::default(),
        Arc::new(transport.clone()),
    );
    let alipay = AlipayClient::new(
        TestDataFactory::alipay_config("https://mapi.test"),
        ClientConfig::default(),
        Arc::new(transport.clone()),
    );

    let shengpay_refund = ParameterSet::from([
        ("OrderNo", "S1"),
        ("RefundOrderNo", "R1"),
        ("RefundAmount", "1.00"),
        ("NotifyUrl", "https://shop.test/n"),
    ]);
    let alipay_refund = ParameterSet::from([
        ("batch_no", "201701010001"),
        ("batch_num", "1"),
        ("detail_data", "2014^0.01^reason"),
    ]);

    assert!(matches!(
        shengpay.refund(shengpay_refund.clone(), CallOptions::new()).await,
        Err(AppError::Configuration(_))
    ));
    assert!(matches!(
        alipay.refund(alipay_refund.clone(), CallOptions::new()).await,
        Err(AppError::Configuration(_))
    ));
    assert_eq!(transport.call_count(), 0);

    let with_cert = || CallOptions::new().certificate(TestDataFactory::test_certificate());
    shengpay.refund(shengpay_refund, with_cert()).await.unwrap();
    alipay.refund(alipay_refund, with_cert()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.tls.client_certificate.is_some()));
    assert!(requests[1]
        .body
        .as_deref()
        .unwrap()
        .contains("service=refund_fastpay_by_platform_nopwd"));
}

#[test]
fn test_certificate_loaded_from_pem_files() {
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("apiclient_cert.pem");
    let key_path = dir.path().join("apiclient_key.pem");
    std::fs::write(&cert_path, TEST_CERT_PEM).unwrap();
    std::fs::write(&key_path, TEST_KEY_PEM).unwrap();

    let certificate = ClientCertificate::from_pem_files(&cert_path, &key_path).unwrap();
    assert_eq!(certificate.cert_pem(), TEST_CERT_PEM);

    let vars: HashMap<&str, String> = HashMap::from([
        ("WECHAT_APP_ID", WECHAT_APP_ID.to_string()),
        ("WECHAT_MCH_ID", WECHAT_MCH_ID.to_string()),
        ("WECHAT_KEY", WECHAT_KEY.to_string()),
        ("WECHAT_CERT_PATH", cert_path.display().to_string()),
        ("WECHAT_KEY_PATH", key_path.display().to_string()),
    ]);
    let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
    assert!(config.wechat.unwrap().credentials.certificate.is_some());
}

#[test]
fn test_missing_certificate_file_is_reported() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("ALIPAY_PARTNER", "2088"),
        ("ALIPAY_KEY", "k"),
        ("ALIPAY_CERT_PATH", "/nonexistent/cert.pem"),
        ("ALIPAY_KEY_PATH", "/nonexistent/key.pem"),
    ]);
    let err = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}

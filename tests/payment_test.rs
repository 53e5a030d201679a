use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use libris::config::{MomoConfig, ZaloPayConfig};
use libris::domain::DomainError;
use libris::payment::{hmac_sha256_hex, momo, zalopay};
use sha2::Sha256;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn momo_config(endpoint: &str) -> MomoConfig {
    MomoConfig {
        partner_code: "MOMOTEST".to_string(),
        access_key: "access-key".to_string(),
        secret_key: "secret-key".to_string(),
        endpoint: endpoint.to_string(),
        redirect_url: "https://shop.example/return".to_string(),
        ipn_url: "https://shop.example/notify".to_string(),
    }
}

fn zalopay_config(endpoint: &str) -> ZaloPayConfig {
    ZaloPayConfig {
        app_id: 2553,
        key1: "key-one".to_string(),
        endpoint: endpoint.to_string(),
    }
}

#[test]
fn momo_signature_covers_the_exact_canonical_string() {
    let config = momo_config("https://example.invalid");
    let order = momo::build_order(&config, 50000, "Fine payment", 1700000000000);

    // Independent digest over the documented concatenation
    let canonical = format!(
        "accessKey={}&amount={}&extraData={}&ipnUrl={}&orderId={}&orderInfo={}&partnerCode={}&redirectUrl={}&requestId={}&requestType={}",
        "access-key",
        "50000",
        "",
        "https://shop.example/notify",
        "MM1700000000000",
        "Fine payment",
        "MOMOTEST",
        "https://shop.example/return",
        "MOMOTEST1700000000000",
        "payWithATM",
    );
    let mut mac =
        Hmac::<Sha256>::new_from_slice(b"secret-key").expect("hmac accepts any key length");
    mac.update(canonical.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    assert_eq!(order.signature, expected);
    assert_eq!(order.signature, hmac_sha256_hex("secret-key", &canonical));
}

#[test]
fn momo_signature_changes_with_the_amount() {
    let config = momo_config("https://example.invalid");
    let a = momo::build_order(&config, 50000, "Fine payment", 1700000000000);
    let b = momo::build_order(&config, 50001, "Fine payment", 1700000000000);
    assert_ne!(a.signature, b.signature);
}

#[test]
fn zalopay_mac_covers_the_pipe_payload() {
    let config = zalopay_config("https://example.invalid");
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let order = zalopay::build_order(&config, 50000, "reader1", "zalopayapp", date, 42, 1700000000000);

    assert_eq!(order.app_trans_id, "240307_42");
    assert_eq!(order.embed_data, "{}");

    let payload = format!(
        "2553|240307_42|reader1|50000|1700000000000|{}|{}",
        order.embed_data, order.item
    );
    let mut mac = Hmac::<Sha256>::new_from_slice(b"key-one").expect("hmac accepts any key length");
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    assert_eq!(order.mac, expected);
}

#[tokio::test]
async fn momo_order_round_trips_through_the_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/gateway/api/create"))
        .and(header("content-type", "application/json"))
        .and(body_string_contains("\"requestType\":\"payWithATM\""))
        .and(body_string_contains("\"signature\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultCode": 0,
            "payUrl": "https://test-payment.momo.vn/pay/abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = momo_config(&format!("{}/v2/gateway/api/create", server.uri()));
    let client = reqwest::Client::new();

    let body = momo::create_order(&client, &config, 50000, "Fine payment")
        .await
        .expect("order failed");
    assert_eq!(body["payUrl"], "https://test-payment.momo.vn/pay/abc");
}

#[tokio::test]
async fn momo_non_200_is_a_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = momo_config(&server.uri());
    let client = reqwest::Client::new();

    let err = momo::create_order(&client, &config, 50000, "Fine payment")
        .await
        .unwrap_err();
    match err {
        DomainError::Gateway(msg) => assert!(msg.contains("500")),
        other => panic!("expected gateway error, got {:?}", other),
    }
}

#[tokio::test]
async fn zalopay_order_goes_out_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/create"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("app_id=2553"))
        .and(body_string_contains("app_user=reader1"))
        .and(body_string_contains("mac="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "return_code": 1,
            "order_url": "https://sb-openapi.zalopay.vn/pay/abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = zalopay_config(&format!("{}/v2/create", server.uri()));
    let client = reqwest::Client::new();

    let body = zalopay::create_order(&client, &config, 50000, "reader1", "zalopayapp")
        .await
        .expect("order failed");
    assert_eq!(body["return_code"], 1);
}

#[tokio::test]
async fn zalopay_transport_failure_is_a_gateway_error() {
    // Nothing listens here
    let config = zalopay_config("http://127.0.0.1:1/v2/create");
    let client = reqwest::Client::new();

    let err = zalopay::create_order(&client, &config, 50000, "reader1", "zalopayapp")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Gateway(_)));
}

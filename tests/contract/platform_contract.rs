//! Contract tests for the per-backend facades
//!
//! Every facade must resolve to the expected HTTP method, host and path,
//! carry its own backend credential, and forward caller options untouched.

use std::sync::Arc;

use mercado_core::{
    Backend, ClientConfig, Credential, HttpMethod, PlatformClient, QueryParams, RequestOptions,
    ScriptedHttpClient, Sdk, IDEMPOTENCY_HEADER, MERCADOLIBRE_BASE_URL, MERCADOPAGO_BASE_URL,
};
use serde_json::json;

fn offline_sdk() -> (Sdk, Arc<ScriptedHttpClient>) {
    let transport = Arc::new(ScriptedHttpClient::default());
    (Sdk::with_http_client(transport.clone()), transport)
}

#[tokio::test]
async fn mercadolibre_facades_hit_the_marketplace_host() {
    let (sdk, transport) = offline_sdk();
    sdk.set_access_token(Backend::MercadoLibre, "APP_USR-ml");
    let api = sdk.mercadolibre();

    api.me(RequestOptions::default()).await.expect("me");
    api.item("MLA123", RequestOptions::default()).await.expect("item");
    api.search_items(
        "MLB",
        RequestOptions::default().params(QueryParams::new().with("q", "celular").with("limit", 2)),
    )
    .await
    .expect("search");
    api.delete_question(99_u64, RequestOptions::default())
        .await
        .expect("delete");

    let requests = transport.requests();
    let calls: Vec<(HttpMethod, &str)> = requests
        .iter()
        .map(|request| (request.method, request.url.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![
            (HttpMethod::Get, "https://api.mercadolibre.com/users/me"),
            (HttpMethod::Get, "https://api.mercadolibre.com/items/MLA123"),
            (
                HttpMethod::Get,
                "https://api.mercadolibre.com/sites/MLB/search?q=celular&limit=2"
            ),
            (HttpMethod::Delete, "https://api.mercadolibre.com/questions/99"),
        ]
    );
    for request in &requests {
        assert_eq!(request.header("authorization"), Some("Bearer APP_USR-ml"));
    }
}

#[tokio::test]
async fn mercadopago_facades_send_bodies_and_idempotency_keys() {
    let (sdk, transport) = offline_sdk();
    sdk.set_access_token(Backend::MercadoPago, "APP_USR-mp");
    let payment = json!({
        "transaction_amount": 150.0,
        "payment_method_id": "pix",
        "payer": {"email": "buyer@example.com"}
    });

    sdk.mercadopago()
        .create_payment(
            RequestOptions::default()
                .body(payment.clone())
                .idempotency_key("pay-0001"),
        )
        .await
        .expect("create");
    sdk.mercadopago()
        .refund_payment(123456_u64, RequestOptions::default())
        .await
        .expect("refund");

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, format!("{MERCADOPAGO_BASE_URL}/v1/payments"));
    assert_eq!(requests[0].body.as_ref(), Some(&payment));
    assert_eq!(requests[0].header(IDEMPOTENCY_HEADER), Some("pay-0001"));
    assert_eq!(requests[0].header("authorization"), Some("Bearer APP_USR-mp"));

    assert_eq!(requests[1].method, HttpMethod::Post);
    assert_eq!(
        requests[1].url,
        format!("{MERCADOPAGO_BASE_URL}/v1/payments/123456/refunds")
    );
    assert_eq!(requests[1].header(IDEMPOTENCY_HEADER), None);
}

#[tokio::test]
async fn hybrid_facades_use_their_own_credential_on_the_payments_host() {
    let (sdk, transport) = offline_sdk();
    sdk.set_access_token(Backend::MercadoPago, "APP_USR-mp");
    sdk.set_access_token(Backend::Hybrid, "APP_USR-hybrid");

    sdk.hybrid()
        .create_point_payment_intent("PAX_A910__SMARTPOS1234", RequestOptions::default())
        .await
        .expect("intent");

    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(
        request.url,
        format!(
            "{MERCADOPAGO_BASE_URL}/point/integration-api/devices/PAX_A910__SMARTPOS1234/payment-intents"
        )
    );
    assert_eq!(request.header("authorization"), Some("Bearer APP_USR-hybrid"));
}

#[tokio::test]
async fn path_arguments_are_encoded_as_single_segments() {
    let (sdk, transport) = offline_sdk();

    sdk.mercadolibre()
        .item("MLA 1/../admin", RequestOptions::default())
        .await
        .expect("item");

    assert_eq!(
        transport.requests()[0].url,
        format!("{MERCADOLIBRE_BASE_URL}/items/MLA%201%2F..%2Fadmin")
    );
}

#[tokio::test]
async fn caller_supplied_auth_overrides_the_backend_credential() {
    let (sdk, transport) = offline_sdk();
    sdk.set_access_token(Backend::MercadoLibre, "APP_USR-default");
    let seller = Credential::with_access_token("APP_USR-seller");

    sdk.mercadolibre()
        .order(2000003508419013_u64, RequestOptions::default().auth(&seller))
        .await
        .expect("order");

    assert_eq!(
        transport.requests()[0].header("authorization"),
        Some("Bearer APP_USR-seller")
    );
}

#[tokio::test]
async fn facade_method_wins_over_caller_options() {
    let (sdk, transport) = offline_sdk();

    sdk.mercadopago()
        .update_customer("cus-1", RequestOptions::delete().body(json!({"email": "a@b.c"})))
        .await
        .expect("update");

    assert_eq!(transport.requests()[0].method, HttpMethod::Put);
}

#[tokio::test]
async fn anonymous_calls_send_no_authorization_header() {
    let (sdk, transport) = offline_sdk();

    sdk.mercadolibre()
        .site_categories("MLA", RequestOptions::default())
        .await
        .expect("public endpoint");

    let request = &transport.requests()[0];
    assert_eq!(request.header("authorization"), None);
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn token_rotation_through_the_sdk_applies_to_the_next_call() {
    let (sdk, transport) = offline_sdk();
    sdk.set_access_token(Backend::MercadoPago, "APP_USR-old");
    sdk.mercadopago()
        .payment(1, RequestOptions::default())
        .await
        .expect("first");

    sdk.set_access_token(Backend::MercadoPago, "APP_USR-new");
    sdk.mercadopago()
        .payment(1, RequestOptions::default())
        .await
        .expect("second");

    let tokens: Vec<Option<String>> = transport
        .requests()
        .iter()
        .map(|request| request.header("authorization").map(str::to_owned))
        .collect();
    assert_eq!(
        tokens,
        vec![
            Some(String::from("Bearer APP_USR-old")),
            Some(String::from("Bearer APP_USR-new")),
        ]
    );
}

#[tokio::test]
async fn custom_base_url_is_honored_by_facades() {
    let transport = Arc::new(ScriptedHttpClient::default());
    let sandbox = PlatformClient::with_http_client(
        ClientConfig::new("http://localhost:8080/"),
        transport.clone(),
    );
    let credential = Credential::new();

    mercado_core::MercadoPagoApi::new(&sandbox, &credential)
        .search_payments(RequestOptions::default().param("status", "approved"))
        .await
        .expect("search");

    assert_eq!(
        transport.requests()[0].url,
        "http://localhost:8080/v1/payments/search?status=approved"
    );
}

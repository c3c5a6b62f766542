//! HTTP-level aggregation scenarios against a mock provider.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use insurance_offers::api::rest::{AppState, create_router};
use insurance_offers::application::services::{
    AggregatorConfig, DegradeReason, MockOfferGenerator, OfferSource, ProviderAggregator,
    RecordingNotifier,
};
use insurance_offers::domain::value_objects::{CoverageType, SearchRequest};
use insurance_offers::infrastructure::providers::{
    ConfigurationError, DirectTransport, HttpClient, ProviderCredentials, ProviderTransport,
    ProxyTransport,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_request() -> SearchRequest {
    SearchRequest::new(
        "BR",
        "EUROPE",
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 7, 11).unwrap(),
        vec![34, 7],
    )
    .unwrap()
}

fn direct() -> Arc<dyn ProviderTransport> {
    Arc::new(DirectTransport::new(HttpClient::new(2_000).unwrap()))
}

fn aggregator(transport: Arc<dyn ProviderTransport>) -> (ProviderAggregator, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = ProviderAggregator::new(transport, notifier.clone(), AggregatorConfig::default());
    (engine, notifier)
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .mount(server)
        .await;
}

async fn provider_requests(server: &MockServer) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() != "/auth/login")
        .collect()
}

async fn spawn_router(credentials: ProviderCredentials) -> SocketAddr {
    let (server_aggregator, _) = aggregator(direct());
    let state = Arc::new(AppState {
        aggregator: Arc::new(server_aggregator),
        credentials,
        upstream: direct(),
        mock_generator: MockOfferGenerator::default(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn first_search_success_returns_plans_in_order() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/plans/search"))
        .and(header("Login", "agent"))
        .and(header("Senha", "secret"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({ "departure_date": "2025-07-01", "ages": [34, 7] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plans": [
                { "id": "ua-60", "name": "UA 60", "price": 189.9, "rating": 4.8 },
                { "id": "ua-150", "name": "UA 150", "price": "249.50" },
                { "id": "ua-300", "name": "UA 300", "price": 399 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, notifier) = aggregator(direct());
    let credentials = ProviderCredentials::with_login(server.uri(), "agent", "secret");
    let outcome = assert_ok!(engine.search(&search_request(), &credentials).await);

    assert_eq!(
        outcome.source,
        OfferSource::Provider {
            path: "/plans/search".to_string(),
            shape: "snake_case",
        }
    );
    let names: Vec<&str> = outcome.offers.iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["UA 60", "UA 150", "UA 300"]);
    assert!(outcome.offers[0].is_recommended());
    assert!(!outcome.offers[1].is_recommended());
    assert_eq!(outcome.offers[1].price(), Decimal::from_str("249.50").unwrap());
    assert_eq!(provider_requests(&server).await.len(), 1);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn forbidden_search_endpoint_moves_to_next_path() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/plans/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "forbidden" })))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "codigo": "A1", "nome": "Plano A", "valorBruto": "R$ 189,90" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, notifier) = aggregator(direct());
    let credentials = ProviderCredentials::with_api_key(server.uri(), "key-1");
    let outcome = engine
        .search(&search_request(), &credentials)
        .await
        .unwrap();

    assert_eq!(
        outcome.source,
        OfferSource::Provider {
            path: "/plans".to_string(),
            shape: "snake_case",
        }
    );
    assert_eq!(outcome.attempts, 4);
    let offer = &outcome.offers[0];
    assert_eq!(offer.id().as_str(), "A1");
    assert_eq!(offer.name(), "Plano A");
    assert_eq!(offer.price(), Decimal::from_str("189.90").unwrap());
    assert_eq!(notifier.count(), 0);

    let calls = provider_requests(&server).await;
    assert!(
        calls
            .iter()
            .all(|r| r.headers.get("X-API-Key").and_then(|v| v.to_str().ok()) == Some("key-1"))
    );
}

#[tokio::test]
async fn native_shape_and_nested_coverages_are_understood() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/plans/search"))
        .and(body_partial_json(json!({ "origem": "BR", "dias": 11 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "plans": [{
                    "planId": 77,
                    "title": "UA Europa",
                    "total": "1.234,56",
                    "coberturas": [
                        { "tipo": "Despesas Medicas", "valor": 30000 },
                        { "tipo": "Bagagem", "valor": 1500 }
                    ],
                    "beneficios": [{ "nome": "Telemedicina" }]
                }]
            }
        })))
        .mount(&server)
        .await;

    let (engine, _) = aggregator(direct());
    let credentials = ProviderCredentials::with_api_key(server.uri(), "key");
    let outcome = engine.search(&search_request(), &credentials).await.unwrap();

    assert_eq!(
        outcome.source,
        OfferSource::Provider {
            path: "/plans/search".to_string(),
            shape: "native",
        }
    );
    let offer = &outcome.offers[0];
    assert_eq!(offer.id().as_str(), "77");
    assert_eq!(offer.price(), Decimal::from_str("1234.56").unwrap());
    assert_eq!(offer.coverage().amount(CoverageType::Baggage), Decimal::from(1500));
    assert_eq!(offer.benefits(), ["Telemedicina".to_string()]);
}

#[tokio::test]
async fn total_failure_returns_mock_offers_and_notifies_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "unauthorized" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, notifier) = aggregator(direct());
    let credentials = ProviderCredentials::with_login(server.uri(), "agent", "wrong");
    let offers = engine
        .fetch_offers(&search_request(), &credentials)
        .await
        .unwrap();

    assert_eq!(offers.len(), 5);
    assert!(offers[0].is_recommended());
    for offer in &offers {
        assert!(offer.price() >= Decimal::ZERO);
        assert!(!offer.benefits().is_empty());
        for coverage_type in CoverageType::ALL {
            assert!(offer.coverage().amount(coverage_type) > Decimal::ZERO);
        }
    }

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].reason, DegradeReason::DirectConnectionFailed);

    let calls = provider_requests(&server).await;
    assert_eq!(calls.len(), engine.probe_plan().len() + 1);
    let last = calls.last().unwrap();
    assert_eq!(last.method.as_str(), "GET");
    assert!(last.body.is_empty());

    let auth_header = calls[0]
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(auth_header.as_deref(), Some("Bearer placeholder-token"));
}

#[tokio::test]
async fn fallback_get_rescues_search() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "Listed Plan", "price": 120 }]
        })))
        .mount(&server)
        .await;

    let (engine, notifier) = aggregator(direct());
    let credentials = ProviderCredentials::with_api_key(server.uri(), "key");
    let outcome = engine.search(&search_request(), &credentials).await.unwrap();

    assert_eq!(
        outcome.source,
        OfferSource::Fallback {
            path: "/plans".to_string()
        }
    );
    assert_eq!(outcome.offers[0].name(), "Listed Plan");
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (engine, notifier) = aggregator(direct());
    let err = assert_err!(
        engine
            .fetch_offers(&search_request(), &ProviderCredentials::new(server.uri()))
            .await
    );
    assert_eq!(err, ConfigurationError::MissingIdentity);

    let login_only = ProviderCredentials {
        username: Some("agent".to_string()),
        ..ProviderCredentials::new(server.uri())
    };
    assert_err!(engine.fetch_offers(&search_request(), &login_only).await);

    let no_url = ProviderCredentials::with_api_key("", "key");
    assert_eq!(
        engine
            .fetch_offers(&search_request(), &no_url)
            .await
            .unwrap_err(),
        ConfigurationError::MissingBaseUrl
    );
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn proxy_mock_data_is_used_when_proxy_fails() {
    let proxy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "error": "upstream unreachable",
            "status": 502,
            "mockData": [
                { "id": "p1", "name": "Proxy Basic", "price": "99.90" },
                { "id": "p2", "name": "Proxy Plus", "price": "149.90" }
            ]
        })))
        .mount(&proxy)
        .await;

    let transport = Arc::new(ProxyTransport::new(
        HttpClient::new(2_000).unwrap(),
        format!("{}/functions/provider-proxy", proxy.uri()),
    ));
    let (engine, notifier) = aggregator(transport);
    let credentials = ProviderCredentials::with_api_key("https://provider.invalid", "key");
    let outcome = engine.search(&search_request(), &credentials).await.unwrap();

    assert_eq!(outcome.source, OfferSource::ProxyMockData);
    assert_eq!(outcome.offers.len(), 2);
    assert_eq!(outcome.offers[0].name(), "Proxy Basic");
    assert_eq!(notifier.notices()[0].reason, DegradeReason::ProxyFailed);

    let received = proxy.received_requests().await.unwrap();
    let first: Value = received[0].body_json().unwrap();
    assert_eq!(first["path"], "/auth/login");
    assert_eq!(first["method"], "POST");
    assert_eq!(first["headers"]["X-API-Key"], "key");
}

#[tokio::test]
async fn proxy_endpoint_forwards_to_provider() {
    let provider = MockServer::start().await;
    mount_auth(&provider).await;
    Mock::given(method("POST"))
        .and(path("/plans/search"))
        .and(header("X-API-Key", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offers": [{ "id": "via-proxy", "name": "Proxied", "price": 80 }]
        })))
        .mount(&provider)
        .await;

    let credentials = ProviderCredentials::with_api_key(provider.uri(), "key");
    let addr = spawn_router(credentials.clone()).await;

    let transport = Arc::new(ProxyTransport::new(
        HttpClient::new(2_000).unwrap(),
        format!("http://{}/api/v1/proxy", addr),
    ));
    let (engine, notifier) = aggregator(transport);
    let outcome = engine.search(&search_request(), &credentials).await.unwrap();

    assert_eq!(outcome.offers[0].id().as_str(), "via-proxy");
    assert!(!outcome.is_degraded());
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn proxy_endpoint_attaches_server_identity_to_bare_envelope() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plans"))
        .and(header("Login", "agent"))
        .and(header("Senha", "007123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plans": [{ "id": "p-1", "name": "Basic", "price": 40 }]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let addr = spawn_router(ProviderCredentials::with_login(
        provider.uri(),
        "agent",
        "007123",
    ))
    .await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/v1/proxy", addr))
        .json(&json!({ "method": "GET", "path": "/plans" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["plans"][0]["id"], "p-1");
}

#[tokio::test]
async fn proxy_endpoint_keeps_caller_identity() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "plans": [] })))
        .mount(&provider)
        .await;

    let addr = spawn_router(ProviderCredentials::with_login(
        provider.uri(),
        "agent",
        "007123",
    ))
    .await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/v1/proxy", addr))
        .json(&json!({
            "method": "GET",
            "path": "/plans",
            "headers": { "x-api-key": "caller-key" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let forwarded = provider_requests(&provider).await;
    assert_eq!(forwarded.len(), 1);
    assert_eq!(
        forwarded[0].headers.get("x-api-key").unwrap().to_str().unwrap(),
        "caller-key"
    );
    assert!(forwarded[0].headers.get("Login").is_none());
}

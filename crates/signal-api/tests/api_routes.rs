//! API 라우트 통합 테스트.
//!
//! Mock 시세 공급자와 lazy DB 풀로 라우터를 구성해
//! DB 없이 실행 가능한 경로(백테스트, 시그널)를 검증합니다.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use signal_api::routes::create_api_router;
use signal_api::AppState;
use signal_core::PricePoint;
use signal_market::MockProvider;

const HOUR_MILLIS: i64 = 3_600_000;

/// DB 접속 없이 상태를 구성합니다 (lazy pool — 쿼리 전까지 연결 안 함).
fn test_state(provider: MockProvider) -> AppState {
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/signal_test")
        .expect("lazy pool");
    AppState::new(db, Arc::new(provider), None)
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = create_api_router().with_state(test_state(MockProvider::new()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn batch_scores_rejects_non_array_coins() {
    let app = create_api_router().with_state(test_state(MockProvider::new()));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/signals/batch",
            r#"{"coins":"bitcoin"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_scores_rejects_empty_list() {
    let app = create_api_router().with_state(test_state(MockProvider::new()));
    let response = app
        .oneshot(json_request("POST", "/api/signals/batch", r#"{"coins":[]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backtest_rejects_out_of_range_days() {
    let app = create_api_router().with_state(test_state(MockProvider::new()));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/backtest",
            r#"{"symbol":"bitcoin","days":9999}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backtest_rejects_invalid_timeframe() {
    let app = create_api_router().with_state(test_state(MockProvider::new()));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/backtest",
            r#"{"symbol":"bitcoin","timeframe":"3h"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backtest_runs_against_fixture_series() {
    // 48시간 완만한 상승 시계열
    let fixture: Vec<PricePoint> = (0..48)
        .map(|i| PricePoint::new(i * HOUR_MILLIS, dec!(100) + rust_decimal::Decimal::from(i)))
        .collect();
    let provider = MockProvider::new().with_fixture("bitcoin", fixture);

    let app = create_api_router().with_state(test_state(provider));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/backtest",
            r#"{"symbol":"bitcoin","days":2,"timeframe":"4h"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // 4h 리샘플링: 48포인트 → 12버킷
    assert_eq!(json["dataPoints"], 12);
    assert!(json["summary"]["finalCapital"].is_number() || json["summary"]["finalCapital"].is_string());
    assert!(json["equityCurve"].as_array().unwrap().len() <= 100);
    assert!(json["trades"].as_array().unwrap().len() <= 50);
}

#[tokio::test]
async fn score_endpoint_returns_snapshot_in_range() {
    let app = create_api_router().with_state(test_state(MockProvider::new()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/signals/bitcoin?days=7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let score = json["score"].as_i64().unwrap();
    assert!((40..=140).contains(&score));
    assert!(json["action"].is_string());
}

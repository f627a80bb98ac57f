//! CoinGecko 시세 공급자.
//!
//! `market_chart` 및 `simple/price` 엔드포인트를 감싸는 얇은
//! HTTP 클라이언트입니다. 재시도/백오프는 수행하지 않습니다 —
//! 조회 실패는 호출자에게 그대로 전파되어 실행 전체를 중단시킵니다.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use signal_core::PricePoint;

use crate::error::MarketError;
use crate::provider::MarketDataProvider;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// `market_chart` 응답 본문.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// `[[timestamp_ms, price], …]`
    prices: Vec<(i64, Decimal)>,
}

/// CoinGecko HTTP 클라이언트.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    /// 기본 엔드포인트로 공급자를 생성합니다.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }

    /// 베이스 URL을 교체합니다 (테스트/프록시용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API 키를 설정합니다 (demo 플랜 헤더).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// 환경 변수에서 공급자를 생성합니다.
    ///
    /// - `COINGECKO_BASE_URL`: 베이스 URL 오버라이드
    /// - `COINGECKO_API_KEY`: demo API 키
    pub fn from_env() -> Self {
        let mut provider = Self::new();
        if let Ok(base_url) = std::env::var("COINGECKO_BASE_URL") {
            provider.base_url = base_url;
        }
        provider.api_key = std::env::var("COINGECKO_API_KEY").ok();
        provider
    }

    /// 공통 GET 요청 빌드 (API 키 헤더 포함).
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }
        request
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn price_history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketError> {
        let path = format!(
            "/api/v3/coins/{}/market_chart?vs_currency=usd&days={}",
            coin_id, days
        );

        let response = self.get(&path).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(coin = coin_id, status = status.as_u16(), "시세 조회 실패");
            if status.as_u16() == 404 {
                return Err(MarketError::UnknownCoin(coin_id.to_string()));
            }
            return Err(MarketError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chart: MarketChartResponse = response
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        let points: Vec<PricePoint> = chart
            .prices
            .into_iter()
            .map(|(timestamp, price)| PricePoint::new(timestamp, price))
            .collect();

        debug!(coin = coin_id, days = days, count = points.len(), "시세 조회 완료");
        Ok(points)
    }

    async fn current_price(&self, coin_id: &str) -> Result<Decimal, MarketError> {
        let path = format!("/api/v3/simple/price?ids={}&vs_currencies=usd", coin_id);

        let response = self.get(&path).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let prices: HashMap<String, HashMap<String, Decimal>> = response
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        prices
            .get(coin_id)
            .and_then(|per_currency| per_currency.get("usd"))
            .copied()
            .ok_or_else(|| MarketError::UnknownCoin(coin_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_price_history_parses_chart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=7",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"prices":[[1700000000000,42000.5],[1700003600000,42100.0]]}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::new().with_base_url(server.url());
        let points = provider.price_history("bitcoin", 7).await.unwrap();

        mock.assert_async().await;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, 1_700_000_000_000);
        assert_eq!(points[0].price, dec!(42000.5));
        assert_eq!(points[1].price, dec!(42100.0));
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=7",
            )
            .with_status(500)
            .with_body("upstream broke")
            .expect(1) // 단일 호출 — 재시도 없음
            .create_async()
            .await;

        let provider = CoinGeckoProvider::new().with_base_url(server.url());
        let result = provider.price_history("bitcoin", 7).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(MarketError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_unknown_coin_maps_to_404() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/api/v3/coins/doesnotexist/market_chart?vs_currency=usd&days=30",
            )
            .with_status(404)
            .with_body(r#"{"error":"coin not found"}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::new().with_base_url(server.url());
        let result = provider.price_history("doesnotexist", 30).await;
        assert!(matches!(result, Err(MarketError::UnknownCoin(_))));
    }

    #[tokio::test]
    async fn test_current_price() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/simple/price?ids=bitcoin&vs_currencies=usd")
            .with_status(200)
            .with_body(r#"{"bitcoin":{"usd":43250.25}}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::new().with_base_url(server.url());
        let price = provider.current_price("bitcoin").await.unwrap();
        assert_eq!(price, dec!(43250.25));
    }
}

//! Mock 시세 공급자 (개발/테스트용).
//!
//! 외부 API 없이 결정적인 합성 시계열을 생성하거나,
//! 코인별 고정 픽스처를 반환합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use signal_core::PricePoint;

use crate::error::MarketError;
use crate::provider::MarketDataProvider;

const HOUR_MILLIS: i64 = 3_600_000;

/// Mock 시세 공급자.
#[derive(Debug, Default)]
pub struct MockProvider {
    /// 코인별 고정 시계열 (없으면 합성 시계열 생성)
    fixtures: HashMap<String, Vec<PricePoint>>,
    /// 합성 시계열 기준 가격
    base_price: f64,
}

impl MockProvider {
    /// 합성 시계열 기반 Mock 공급자를 생성합니다.
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
            base_price: 50_000.0,
        }
    }

    /// 합성 시계열의 기준 가격을 설정합니다.
    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// 특정 코인의 고정 시계열을 등록합니다.
    pub fn with_fixture(mut self, coin_id: impl Into<String>, points: Vec<PricePoint>) -> Self {
        self.fixtures.insert(coin_id.into(), points);
        self
    }

    /// 시간봉 합성 시계열 생성.
    ///
    /// sin/cos 노이즈 + 완만한 상승 추세. 동일 인자에 대해
    /// 시작 시각을 제외하면 결정적입니다.
    fn synthetic_series(&self, days: u32) -> Vec<PricePoint> {
        let hours = (days as i64) * 24;
        let now_ms = Utc::now().timestamp_millis();
        let start_ms = now_ms - hours * HOUR_MILLIS;

        (0..hours)
            .map(|i| {
                let noise = ((i as f64 * 0.7).sin() + (i as f64 * 1.3).cos()) * 0.02;
                let trend = i as f64 * 0.0002;
                let price = self.base_price * (1.0 + noise + trend);

                PricePoint::new(
                    start_ms + i * HOUR_MILLIS,
                    Decimal::from_f64(price)
                        .unwrap_or_else(|| Decimal::from_f64(self.base_price).unwrap_or_default()),
                )
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn price_history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketError> {
        if let Some(points) = self.fixtures.get(coin_id) {
            return Ok(points.clone());
        }
        Ok(self.synthetic_series(days))
    }

    async fn current_price(&self, coin_id: &str) -> Result<Decimal, MarketError> {
        let history = self.price_history(coin_id, 1).await?;
        history
            .last()
            .map(|p| p.price)
            .ok_or_else(|| MarketError::UnknownCoin(coin_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_synthetic_series_is_ordered() {
        let provider = MockProvider::new();
        let points = provider.price_history("bitcoin", 3).await.unwrap();

        assert_eq!(points.len(), 72);
        for pair in points.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn test_fixture_takes_precedence() {
        let fixture = vec![
            PricePoint::new(0, dec!(100)),
            PricePoint::new(HOUR_MILLIS, dec!(101)),
        ];
        let provider = MockProvider::new().with_fixture("bitcoin", fixture.clone());

        let points = provider.price_history("bitcoin", 30).await.unwrap();
        assert_eq!(points, fixture);

        let price = provider.current_price("bitcoin").await.unwrap();
        assert_eq!(price, dec!(101));
    }
}

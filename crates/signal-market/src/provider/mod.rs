//! 시세 공급자 인터페이스.

use async_trait::async_trait;
use rust_decimal::Decimal;
use signal_core::PricePoint;

use crate::error::MarketError;

pub mod coingecko;
pub mod mock;

/// 시세 데이터 공급자.
///
/// 구현체는 timestamp 오름차순으로 정렬된 시계열을 반환해야
/// 합니다. 소비자(백테스트 엔진, 점수 계산)는 정렬을 재검증하지
/// 않습니다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 과거 가격 시계열을 조회합니다.
    ///
    /// `days` 일치 lookback, 해상도는 공급자 정책
    /// (CoinGecko: 90일 이하 시간봉, 초과 시 일봉).
    async fn price_history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketError>;

    /// 현재 가격을 조회합니다.
    async fn current_price(&self, coin_id: &str) -> Result<Decimal, MarketError>;
}

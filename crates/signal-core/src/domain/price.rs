//! 가격 시계열 포인트.
//!
//! 외부 시세 API가 반환하는 `[timestamp_ms, price]` 쌍을 표현합니다.
//! 시계열은 timestamp 오름차순으로 정렬되어 있다고 가정하며,
//! 엔진은 정렬 여부를 재검증하지 않습니다 (공급자 계약).

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시계열의 단일 가격 관측치.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "ts-rs-support", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts-rs-support", ts(export))]
pub struct PricePoint {
    /// 관측 시각 (epoch millis, UTC)
    pub timestamp: i64,
    /// 관측 가격
    #[cfg_attr(feature = "ts-rs-support", ts(type = "string"))]
    pub price: Decimal,
}

impl PricePoint {
    /// 새 가격 포인트를 생성합니다.
    pub fn new(timestamp: i64, price: Decimal) -> Self {
        Self { timestamp, price }
    }

    /// epoch millis를 `DateTime<Utc>`로 변환합니다.
    ///
    /// 범위를 벗어난 timestamp는 UNIX epoch로 수렴합니다
    /// (시세 API가 반환하는 값은 항상 범위 내에 있음).
    pub fn datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_datetime_conversion() {
        let point = PricePoint::new(1_700_000_000_000, dec!(42000));
        assert_eq!(point.datetime().timestamp_millis(), 1_700_000_000_000);
    }
}

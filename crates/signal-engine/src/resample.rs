//! 시계열 리샘플러.
//!
//! 오름차순 가격 시계열을 고정 폭 시간 버킷으로 묶고,
//! 버킷마다 마지막 관측 가격을 남깁니다 (종가 의미론).
//! 관측치가 없는 버킷은 출력에서 생략됩니다 (보간/forward-fill 없음).

use signal_core::PricePoint;

const HOUR_MILLIS: i64 = 3_600_000;

/// 시계열을 `bucket_hours` 폭 버킷으로 리샘플링합니다.
///
/// 출력 포인트의 timestamp는 버킷 하한
/// (`floor(ts / bucket_ms) * bucket_ms`)이고, 가격은 해당 버킷에서
/// 마지막으로 관측된 가격입니다. 입력은 timestamp 오름차순이어야
/// 하며, 단일 순방향 패스로 처리됩니다.
///
/// 빈 입력 또는 단일 포인트 입력은 포인트 1개 이하를 반환합니다.
pub fn resample(points: &[PricePoint], bucket_hours: i64) -> Vec<PricePoint> {
    let bucket_millis = bucket_hours * HOUR_MILLIS;
    let mut output = Vec::new();

    let mut current_key: Option<i64> = None;
    let mut last_price = None;

    for point in points {
        let key = point.timestamp.div_euclid(bucket_millis) * bucket_millis;

        match current_key {
            Some(prev_key) if prev_key != key => {
                // 버킷 경계 통과: 직전 버킷의 마지막 가격 방출
                if let Some(price) = last_price {
                    output.push(PricePoint::new(prev_key, price));
                }
                current_key = Some(key);
            }
            None => current_key = Some(key),
            _ => {}
        }

        last_price = Some(point.price);
    }

    if let (Some(key), Some(price)) = (current_key, last_price) {
        output.push(PricePoint::new(key, price));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn point(hours: i64, price: rust_decimal::Decimal) -> PricePoint {
        PricePoint::new(hours * HOUR_MILLIS, price)
    }

    #[test]
    fn test_empty_and_single() {
        assert!(resample(&[], 4).is_empty());

        let out = resample(&[point(1, dec!(100))], 4);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, 0);
        assert_eq!(out[0].price, dec!(100));
    }

    #[test]
    fn test_last_price_wins_per_bucket() {
        let series = [
            point(0, dec!(100)),
            point(1, dec!(101)),
            point(3, dec!(102)), // 0~4h 버킷의 마지막
            point(4, dec!(110)),
            point(7, dec!(111)), // 4~8h 버킷의 마지막
        ];

        let out = resample(&series, 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, 0);
        assert_eq!(out[0].price, dec!(102));
        assert_eq!(out[1].timestamp, 4 * HOUR_MILLIS);
        assert_eq!(out[1].price, dec!(111));
    }

    #[test]
    fn test_bucket_floor_alignment() {
        // 버킷 중간에서 시작해도 출력 timestamp는 버킷 하한
        let series = [point(5, dec!(100)), point(26, dec!(200))];
        let out = resample(&series, 24);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, 0);
        assert_eq!(out[1].timestamp, 24 * HOUR_MILLIS);
        for p in &out {
            assert_eq!(p.timestamp % (24 * HOUR_MILLIS), 0);
        }
    }

    #[test]
    fn test_sparse_buckets_absent() {
        // 8~12h 버킷에 관측치 없음 → 출력에서 생략
        let series = [point(1, dec!(100)), point(13, dec!(200))];
        let out = resample(&series, 4);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, 0);
        assert_eq!(out[1].timestamp, 12 * HOUR_MILLIS);
    }
}

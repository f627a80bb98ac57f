//! 체크리스트 점수 시뮬레이터.
//!
//! 가격 모멘텀, 이동평균 괴리, 변동성을 혼합해 40~140 구간의
//! 정수 점수를 산출합니다. 실제 시그널 모델의 합성 대체물이며,
//! 균일 난수 섭동이 섞입니다.
//!
//! # 난수 주입
//!
//! 섭동은 `PerturbationSource` trait 뒤로 분리되어 있습니다.
//! 프로덕션은 `RandomPerturbation`(rand 기반 균일 [-10, 10]),
//! 테스트는 `FixedPerturbation`으로 결정론을 확보합니다.
//! 테스트는 난수 소스 하에서 정확한 점수를 단정하지 말고
//! 범위/방향 속성만 검증해야 합니다.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 점수 하한.
pub const SCORE_MIN: i32 = 40;
/// 점수 상한.
pub const SCORE_MAX: i32 = 140;

/// 이동평균/변동성 계산에 사용하는 추적 윈도우 길이.
const TRAILING_WINDOW: usize = 20;

/// 점수 섭동 소스.
///
/// `jitter()`는 [-10, 10] 구간의 값을 반환해야 합니다.
pub trait PerturbationSource {
    /// 다음 섭동 값을 반환합니다.
    fn jitter(&mut self) -> f64;
}

/// 균일 난수 섭동 (프로덕션용).
pub struct RandomPerturbation<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPerturbation<R> {
    /// 주어진 난수 생성기로 섭동 소스를 만듭니다.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPerturbation<rand::rngs::ThreadRng> {
    /// 스레드 로컬 난수 생성기 기반 섭동 소스.
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> PerturbationSource for RandomPerturbation<R> {
    fn jitter(&mut self) -> f64 {
        self.rng.gen_range(-10.0..=10.0)
    }
}

/// 고정 섭동 (테스트용 결정론 스텁).
pub struct FixedPerturbation(pub f64);

impl PerturbationSource for FixedPerturbation {
    fn jitter(&mut self) -> f64 {
        self.0
    }
}

/// 체크리스트 점수를 계산합니다.
///
/// # 인자
///
/// * `current` - 현재 가격
/// * `previous` - 직전 틱 가격
/// * `history` - 현재 가격을 포함한 누적 가격 이력 (오름차순)
/// * `perturbation` - 섭동 소스
///
/// # 계산
///
/// 1. 가격 변화율: `(current - previous) / previous × 100`
/// 2. 추적 윈도우(≤20) 단순 이동평균 대비 비율
/// 3. 변동성: 추적 윈도우 수익률의 모표준편차 × 100
///    (수익률 관측치가 2개 미만이면 5.0)
/// 4. 베이스 70 + 모멘텀(±15 클램프) + MA 구간 조정 + 변동성 구간 조정
///    + 섭동, 반올림 후 [40, 140] 클램프
pub fn checklist_score(
    current: Decimal,
    previous: Decimal,
    history: &[Decimal],
    perturbation: &mut dyn PerturbationSource,
) -> i32 {
    let current_f = current.to_f64().unwrap_or(0.0);
    let previous_f = previous.to_f64().unwrap_or(0.0);

    let price_change_pct = if previous_f.abs() > f64::EPSILON {
        (current_f - previous_f) / previous_f * 100.0
    } else {
        0.0
    };

    let window_start = history.len().saturating_sub(TRAILING_WINDOW);
    let window: Vec<f64> = history[window_start..]
        .iter()
        .map(|p| p.to_f64().unwrap_or(0.0))
        .collect();

    let moving_average = if window.is_empty() {
        current_f
    } else {
        window.iter().sum::<f64>() / window.len() as f64
    };
    let ma_ratio = if moving_average.abs() > f64::EPSILON {
        current_f / moving_average
    } else {
        1.0
    };

    let volatility_pct = volatility(&window);

    let momentum = (2.0 * price_change_pct).clamp(-15.0, 15.0);

    let ma_adjustment = if ma_ratio > 1.02 {
        8.0
    } else if ma_ratio > 1.00 {
        4.0
    } else if ma_ratio < 0.98 {
        -8.0
    } else if ma_ratio < 1.00 {
        -4.0
    } else {
        0.0
    };

    let volatility_adjustment = if volatility_pct < 3.0 {
        5.0
    } else if volatility_pct > 8.0 {
        -5.0
    } else {
        0.0
    };

    let raw = 70.0 + momentum + ma_adjustment + volatility_adjustment + perturbation.jitter();

    (raw.round() as i32).clamp(SCORE_MIN, SCORE_MAX)
}

/// 수익률 모표준편차 (% 단위).
///
/// 수익률 관측치가 2개 미만이면 기본값 5.0을 반환합니다.
fn volatility(window: &[f64]) -> f64 {
    let returns: Vec<f64> = window
        .windows(2)
        .filter(|w| w[0].abs() > f64::EPSILON)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    if returns.len() < 2 {
        return 5.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    variance.sqrt() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn history(prices: &[i64]) -> Vec<Decimal> {
        prices.iter().map(|p| Decimal::from(*p)).collect()
    }

    #[test]
    fn test_score_in_range_under_random_source() {
        let mut source = RandomPerturbation::new(StdRng::seed_from_u64(7));
        let hist = history(&[100, 101, 99, 102, 104, 103, 105]);

        for _ in 0..200 {
            let score = checklist_score(dec!(105), dec!(103), &hist, &mut source);
            assert!((SCORE_MIN..=SCORE_MAX).contains(&score));
        }
    }

    #[test]
    fn test_rising_price_scores_above_falling() {
        let mut stub = FixedPerturbation(0.0);

        let rising = history(&[100, 101, 102, 103, 104, 105]);
        let falling = history(&[105, 104, 103, 102, 101, 100]);

        let up = checklist_score(dec!(105), dec!(104), &rising, &mut stub);
        let down = checklist_score(dec!(100), dec!(101), &falling, &mut stub);

        assert!(up > down, "up={} down={}", up, down);
    }

    #[test]
    fn test_volatility_defaults_with_short_history() {
        // 수익률 관측치 1개 → 기본 변동성 5.0 (조정 0)
        let mut stub = FixedPerturbation(0.0);
        let hist = history(&[100, 100]);
        let score = checklist_score(dec!(100), dec!(100), &hist, &mut stub);
        // 변화율 0, MA 비율 1.0, 변동성 기본값 → 베이스 그대로
        assert_eq!(score, 70);
    }

    #[test]
    fn test_clamped_to_bounds() {
        let mut high = FixedPerturbation(10.0);
        let mut low = FixedPerturbation(-10.0);
        let flat = history(&[100; 21]);

        let hi = checklist_score(dec!(1000), dec!(100), &flat, &mut high);
        let lo = checklist_score(dec!(10), dec!(100), &flat, &mut low);

        assert!(hi <= SCORE_MAX);
        assert!(lo >= SCORE_MIN);
    }

    #[test]
    fn test_deterministic_with_fixed_source() {
        let hist = history(&[100, 102, 101, 103, 106, 104]);
        let a = checklist_score(dec!(104), dec!(106), &hist, &mut FixedPerturbation(3.0));
        let b = checklist_score(dec!(104), dec!(106), &hist, &mut FixedPerturbation(3.0));
        assert_eq!(a, b);
    }
}

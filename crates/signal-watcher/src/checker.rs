//! 알림 규칙 스윕.
//!
//! 활성 알림 규칙을 코인별로 묶어 시세를 1회씩만 조회하고,
//! 체크리스트 점수를 재계산해 임계값 교차 시 알림을 발송합니다.
//!
//! 개별 코인의 시세 조회 실패나 알림 전송 실패는 해당 규칙만
//! 건너뛰고 스윕 전체를 중단시키지 않습니다. 재시도는 없으며
//! 다음 스윕 주기가 곧 재시도입니다.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use signal_core::{checklist_score, PricePoint, RandomPerturbation, SignalAction};
use signal_market::MarketDataProvider;
use signal_notification::{
    Notification, NotificationSender, TelegramSender, WebhookConfig, WebhookSender,
};

use crate::error::Result;

/// 스윕 대상 규칙 행.
#[derive(Debug, Clone, FromRow)]
pub struct WatchedRule {
    pub id: Uuid,
    pub coin: String,
    pub threshold: i32,
    pub direction: String,
    pub channel: String,
    pub target: Option<String>,
    pub last_score: Option<i32>,
}

/// 스윕 결과 통계.
#[derive(Debug, Default)]
pub struct SweepStats {
    /// 평가한 규칙 수
    pub evaluated: usize,
    /// 발화(알림 발송 시도)한 규칙 수
    pub triggered: usize,
    /// 발송 실패 수
    pub failed: usize,
    /// 시세 조회 실패로 건너뛴 코인 수
    pub skipped_coins: usize,
}

/// 임계값 교차 여부 판정.
///
/// 직전 점수가 없으면(첫 스윕) 기준선만 수립하고 발화하지
/// 않습니다. `above`는 임계값 아래→이상 교차, `below`는
/// 위→이하 교차에서 발화합니다.
pub fn threshold_crossed(
    direction: &str,
    threshold: i32,
    previous: Option<i32>,
    current: i32,
) -> bool {
    let Some(previous) = previous else {
        return false;
    };

    match direction {
        "above" => previous < threshold && current >= threshold,
        "below" => previous > threshold && current <= threshold,
        _ => false,
    }
}

/// 가격 이력에서 점수를 계산합니다.
fn score_from_history(history: &[PricePoint]) -> Option<(i32, Decimal)> {
    let current = history.last()?;
    let previous = if history.len() >= 2 {
        history[history.len() - 2].price
    } else {
        current.price
    };

    let prices: Vec<Decimal> = history.iter().map(|p| p.price).collect();
    let mut perturbation = RandomPerturbation::thread_local();
    let score = checklist_score(current.price, previous, &prices, &mut perturbation);

    Some((score, current.price))
}

/// 활성 규칙 1회 스윕.
pub async fn run_sweep(
    pool: &PgPool,
    provider: &dyn MarketDataProvider,
    telegram: Option<&TelegramSender>,
    lookback_days: u32,
) -> Result<SweepStats> {
    let rules: Vec<WatchedRule> = sqlx::query_as::<_, WatchedRule>(
        r#"
        SELECT id, coin, threshold, direction, channel, target, last_score
        FROM alert_rules
        WHERE enabled = TRUE
        ORDER BY coin ASC, created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    if rules.is_empty() {
        debug!("활성 알림 규칙 없음");
        return Ok(SweepStats::default());
    }

    // 코인별로 묶어 시세 조회를 1회로 줄임
    let mut by_coin: BTreeMap<String, Vec<WatchedRule>> = BTreeMap::new();
    for rule in rules {
        by_coin.entry(rule.coin.clone()).or_default().push(rule);
    }

    let mut stats = SweepStats::default();

    for (coin, coin_rules) in by_coin {
        let history = match provider.price_history(&coin, lookback_days).await {
            Ok(history) => history,
            Err(e) => {
                warn!(coin = %coin, error = %e, "시세 조회 실패, 코인 건너뜀");
                stats.skipped_coins += 1;
                continue;
            }
        };

        let Some((score, price)) = score_from_history(&history) else {
            warn!(coin = %coin, "시세 데이터 없음, 코인 건너뜀");
            stats.skipped_coins += 1;
            continue;
        };

        let action = SignalAction::from_score(score);
        debug!(coin = %coin, score = score, action = %action, "점수 재계산");

        for rule in coin_rules {
            stats.evaluated += 1;
            let crossed = threshold_crossed(&rule.direction, rule.threshold, rule.last_score, score);

            if crossed {
                stats.triggered += 1;
                let delivered =
                    dispatch_alert(pool, telegram, &rule, &coin, score, action, price).await;
                if !delivered {
                    stats.failed += 1;
                }
            }

            record_sweep(pool, rule.id, score, crossed).await?;
        }
    }

    info!(
        evaluated = stats.evaluated,
        triggered = stats.triggered,
        failed = stats.failed,
        skipped_coins = stats.skipped_coins,
        "알림 스윕 완료"
    );
    Ok(stats)
}

/// 규칙 채널로 알림을 발송하고 이력을 남깁니다.
///
/// 반환값은 발송 성공 여부입니다.
async fn dispatch_alert(
    pool: &PgPool,
    telegram: Option<&TelegramSender>,
    rule: &WatchedRule,
    coin: &str,
    score: i32,
    action: SignalAction,
    price: Decimal,
) -> bool {
    let notification = Notification::signal(coin, score, action, price, rule.threshold);
    let message = format!(
        "{} 점수 {} ({}), 임계값 {} {}",
        coin, score, action, rule.threshold, rule.direction
    );

    let send_result = match rule.channel.as_str() {
        "telegram" => match telegram {
            Some(sender) => sender.send(&notification).await,
            None => Err(signal_notification::NotificationError::Config(
                "Telegram 전송기가 설정되지 않았습니다".to_string(),
            )),
        },
        "webhook" => match &rule.target {
            Some(url) => {
                let sender = WebhookSender::new(WebhookConfig::new(url.clone()));
                sender.send(&notification).await
            }
            None => Err(signal_notification::NotificationError::Config(
                "웹훅 규칙에 target URL이 없습니다".to_string(),
            )),
        },
        other => Err(signal_notification::NotificationError::Config(format!(
            "알 수 없는 채널: {}",
            other
        ))),
    };

    let (status, error_message) = match &send_result {
        Ok(()) => {
            info!(rule_id = %rule.id, coin = %coin, score = score, "알림 발송 완료");
            ("SENT", None)
        }
        Err(e) => {
            warn!(rule_id = %rule.id, coin = %coin, error = %e, "알림 발송 실패");
            ("FAILED", Some(e.to_string()))
        }
    };

    let insert_result = sqlx::query(
        r#"
        INSERT INTO alert_history (
            rule_id, coin, score, action, channel, status, message, error_message
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(rule.id)
    .bind(coin)
    .bind(score)
    .bind(action.to_string())
    .bind(&rule.channel)
    .bind(status)
    .bind(&message)
    .bind(&error_message)
    .execute(pool)
    .await;

    if let Err(e) = insert_result {
        warn!(rule_id = %rule.id, error = %e, "알림 이력 기록 실패");
    }

    send_result.is_ok()
}

/// 스윕 결과를 규칙에 기록합니다 (last_score, 발화 시각).
async fn record_sweep(pool: &PgPool, rule_id: Uuid, score: i32, triggered: bool) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE alert_rules
        SET last_score = $2,
            last_triggered_at = CASE WHEN $3 THEN NOW() ELSE last_triggered_at END
        WHERE id = $1
        "#,
    )
    .bind(rule_id)
    .bind(score)
    .bind(triggered)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_sweep_establishes_baseline_only() {
        assert!(!threshold_crossed("above", 105, None, 120));
        assert!(!threshold_crossed("below", 60, None, 40));
    }

    #[test]
    fn test_above_crossing() {
        assert!(threshold_crossed("above", 105, Some(100), 105));
        assert!(threshold_crossed("above", 105, Some(100), 130));
        // 이미 임계값 위에 있으면 재발화하지 않음
        assert!(!threshold_crossed("above", 105, Some(110), 120));
        assert!(!threshold_crossed("above", 105, Some(100), 104));
    }

    #[test]
    fn test_below_crossing() {
        assert!(threshold_crossed("below", 60, Some(70), 60));
        assert!(threshold_crossed("below", 60, Some(70), 45));
        assert!(!threshold_crossed("below", 60, Some(55), 50));
        assert!(!threshold_crossed("below", 60, Some(70), 61));
    }

    #[test]
    fn test_unknown_direction_never_fires() {
        assert!(!threshold_crossed("sideways", 105, Some(100), 120));
    }

    #[test]
    fn test_score_from_history() {
        assert!(score_from_history(&[]).is_none());

        let history = [
            PricePoint::new(0, dec!(100)),
            PricePoint::new(1, dec!(101)),
        ];
        let (score, price) = score_from_history(&history).unwrap();
        assert!((40..=140).contains(&score));
        assert_eq!(price, dec!(101));
    }
}

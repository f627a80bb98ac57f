//! 알림 워처 데몬.
//!
//! 주기적으로 활성 알림 규칙을 스윕해 코인별 체크리스트 점수를
//! 재계산하고, 임계값 교차 시 Telegram/웹훅 알림을 발송합니다.
//!
//! # 실행 모드
//!
//! - 기본: `WATCHER_INTERVAL_SECS` 주기의 상주 데몬
//! - `WATCHER_RUN_ONCE=true`: 단일 스윕 후 종료 (외부 cron 트리거용)

mod checker;
mod config;
mod error;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use signal_market::{CoinGeckoProvider, MarketDataProvider, MockProvider};
use signal_notification::TelegramSender;

use crate::config::WatcherConfig;
use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = WatcherConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        interval_secs = config.interval_secs,
        lookback_days = config.lookback_days,
        run_once = config.run_once,
        "알림 워처 시작"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    info!("데이터베이스 연결 완료");

    let provider: Arc<dyn MarketDataProvider> = if config.use_mock_market {
        info!("Mock 시세 공급자 사용 (USE_MOCK_MARKET=true)");
        Arc::new(MockProvider::new())
    } else {
        Arc::new(CoinGeckoProvider::from_env())
    };

    let telegram = TelegramSender::from_env();
    if telegram.is_none() {
        info!("Telegram 설정 없음 — telegram 채널 규칙은 실패로 기록됩니다");
    }

    if config.run_once {
        let stats =
            checker::run_sweep(&pool, provider.as_ref(), telegram.as_ref(), config.lookback_days)
                .await?;
        info!(evaluated = stats.evaluated, triggered = stats.triggered, "단일 스윕 종료");
        return Ok(());
    }

    let mut ticker = tokio::time::interval(config.interval());
    loop {
        ticker.tick().await;

        match checker::run_sweep(
            &pool,
            provider.as_ref(),
            telegram.as_ref(),
            config.lookback_days,
        )
        .await
        {
            Ok(_) => {}
            Err(e) => {
                // 스윕 실패는 데몬을 죽이지 않음 — 다음 주기에 재시도
                error!(error = %e, "알림 스윕 실패");
            }
        }
    }
}

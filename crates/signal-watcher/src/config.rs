//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use crate::error::{Result, WatcherError};

/// 워처 전체 설정.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 스윕 주기 (초)
    pub interval_secs: u64,
    /// 점수 계산 lookback (일)
    pub lookback_days: u32,
    /// 단일 스윕 후 종료 여부 (cron 트리거 실행용)
    pub run_once: bool,
    /// Mock 시세 공급자 사용 여부
    pub use_mock_market: bool,
}

impl WatcherConfig {
    /// 환경변수에서 설정 로드.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            WatcherError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        Ok(Self {
            database_url,
            interval_secs: env_var_parse("WATCHER_INTERVAL_SECS", 300),
            lookback_days: env_var_parse("WATCHER_LOOKBACK_DAYS", 30),
            run_once: env_var_bool("WATCHER_RUN_ONCE", false),
            use_mock_market: env_var_bool("USE_MOCK_MARKET", false),
        })
    }

    /// 스윕 주기를 Duration으로 반환.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용).
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱.
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

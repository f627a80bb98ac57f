//! 에러 타입 정의.

use std::fmt;

/// 워처 에러 타입.
#[derive(Debug)]
pub enum WatcherError {
    /// 데이터베이스 에러
    Database(sqlx::Error),
    /// 설정 에러
    Config(String),
    /// 시세 공급자 에러
    Market(String),
    /// 알림 전송 에러
    Notification(String),
}

impl fmt::Display for WatcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Market(msg) => write!(f, "Market data error: {}", msg),
            Self::Notification(msg) => write!(f, "Notification error: {}", msg),
        }
    }
}

impl std::error::Error for WatcherError {}

impl From<sqlx::Error> for WatcherError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<std::env::VarError> for WatcherError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result 타입 별칭.
pub type Result<T> = std::result::Result<T, WatcherError>;

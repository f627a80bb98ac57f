//! 백테스트 타임프레임.
//!
//! 대시보드가 지원하는 4개 타임프레임을 정의합니다.
//! 업스트림 시세 API는 시간봉(1h) 해상도로 데이터를 제공하므로,
//! 4h/1d는 리샘플링 대상이고 15m/1h는 그대로 통과시킵니다
//! (시간봉에서 더 세밀한 해상도를 합성할 수 없음).

use serde::{Deserialize, Serialize};

/// 지원 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "ts-rs-support", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts-rs-support", ts(export))]
pub enum Timeframe {
    /// 15분봉
    #[serde(rename = "15m")]
    M15,
    /// 1시간봉
    #[serde(rename = "1h")]
    H1,
    /// 4시간봉
    #[serde(rename = "4h")]
    H4,
    /// 일봉
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// 리샘플링 버킷 폭 (시간 단위).
    ///
    /// `None`이면 업스트림 해상도를 그대로 사용합니다.
    pub fn bucket_hours(&self) -> Option<i64> {
        match self {
            Timeframe::M15 | Timeframe::H1 => None,
            Timeframe::H4 => Some(4),
            Timeframe::D1 => Some(24),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::M15 => write!(f, "15m"),
            Timeframe::H1 => write!(f, "1h"),
            Timeframe::H4 => write!(f, "4h"),
            Timeframe::D1 => write!(f, "1d"),
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(Timeframe::M15),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

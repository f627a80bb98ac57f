//! 시세 공급자 에러 타입.

use thiserror::Error;

/// 시세 공급자 오류.
///
/// 백테스트 경로에서는 어떤 변형도 재시도되지 않고 실행 수준
/// 실패로 전파됩니다 (부분 결과 없음).
#[derive(Debug, Error)]
pub enum MarketError {
    /// 네트워크/전송 오류
    #[error("시세 API 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    /// 비성공 상태 코드
    #[error("시세 API 오류 응답: status={status}")]
    Status { status: u16, body: String },

    /// 응답 본문 파싱 실패
    #[error("시세 응답 파싱 실패: {0}")]
    Parse(String),

    /// 공급자가 모르는 코인 식별자
    #[error("알 수 없는 코인: {0}")]
    UnknownCoin(String),
}

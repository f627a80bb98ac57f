//! API 에러 응답 타입.
//!
//! 모든 핸들러는 실패 시 `(StatusCode, Json<ApiError>)` 쌍을
//! 반환합니다. 응답 본문은 `{ "error": { "code", "message" } }`
//! 형태로 직렬화됩니다.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use signal_market::MarketError;

/// 에러 응답 본문.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// 에러 상세
    pub error: ApiErrorDetail,
}

/// 에러 상세 내용.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorDetail {
    /// 기계 판독용 코드 (예: "bad_request", "upstream_fetch_failed")
    pub code: String,
    /// 사람이 읽을 메시지
    pub message: String,
}

/// 핸들러 결과 타입.
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

impl ApiError {
    /// 새 에러 본문을 생성합니다.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// 400 Bad Request.
pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new("bad_request", message)),
    )
}

/// 404 Not Found.
pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("not_found", message)),
    )
}

/// 500 Internal Server Error.
pub fn internal(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new("internal_error", message)),
    )
}

/// 데이터베이스 오류 → 500.
pub fn database(err: sqlx::Error) -> (StatusCode, Json<ApiError>) {
    tracing::error!(error = %err, "데이터베이스 오류");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new("database_error", "데이터베이스 오류가 발생했습니다")),
    )
}

/// 업스트림 시세 조회 실패 매핑.
///
/// 알 수 없는 코인은 404, 그 외 실패는 일괄 500으로 수렴합니다
/// (부분 결과 없음, 호출자가 전체 실행을 재시도).
pub fn upstream(err: MarketError) -> (StatusCode, Json<ApiError>) {
    match err {
        MarketError::UnknownCoin(coin) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                "unknown_coin",
                format!("알 수 없는 코인: {}", coin),
            )),
        ),
        other => {
            tracing::warn!(error = %other, "업스트림 시세 조회 실패");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(
                    "upstream_fetch_failed",
                    "시세 데이터 조회에 실패했습니다",
                )),
            )
        }
    }
}

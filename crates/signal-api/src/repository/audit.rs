//! 감사 로그 Repository.
//!
//! 모든 쓰기 경로에서 flat 레코드를 append합니다.
//! 기록 실패는 호출 경로를 실패시키지 않습니다 (로그만 남김).

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::warn;

/// 감사 로그 Repository.
pub struct AuditRepository;

impl AuditRepository {
    /// 감사 행 기록. 실패해도 에러를 전파하지 않습니다.
    pub async fn record(pool: &PgPool, user_id: &str, action: &str, detail: JsonValue) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_log (user_id, action, detail)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(&detail)
        .execute(pool)
        .await;

        if let Err(e) = result {
            warn!(error = %e, action = action, "감사 로그 기록 실패");
        }
    }
}

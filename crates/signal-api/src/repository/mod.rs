//! 데이터베이스 Repository 모듈.
//!
//! 모든 Repository는 상태 없는 구조체이며, `&PgPool`을 받는
//! 연관 함수로 런타임 쿼리를 실행합니다. 테이블 스키마는
//! 저장소 루트의 `schema.sql`을 참고하세요.

pub mod alert_history;
pub mod alert_rules;
pub mod audit;
pub mod favorites;
pub mod portfolio;

pub use alert_history::{AlertHistoryEntry, AlertHistoryRepository, NewAlertHistory};
pub use alert_rules::{
    AlertDirection, AlertRule, AlertRulesRepository, CreateAlertRule, UpdateAlertRule,
};
pub use audit::AuditRepository;
pub use favorites::{Favorite, FavoritesRepository};
pub use portfolio::{PortfolioPosition, PortfolioRepository, UpsertPosition};

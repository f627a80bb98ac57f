//! 시그널 대시보드 API 서버 라이브러리.
//!
//! 백테스트, 시그널 점수, 즐겨찾기, 포트폴리오, 알림 규칙
//! 엔드포인트를 제공합니다.

pub mod error;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use state::AppState;

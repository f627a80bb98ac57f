//! 시그널 대시보드 핵심 도메인 크레이트.
//!
//! 가격 시계열, 타임프레임, 체크리스트 점수 모델 등
//! 전체 워크스페이스가 공유하는 기본 타입을 정의합니다.
//!
//! 점수 시뮬레이터는 백테스트 엔진(`signal-engine`)과
//! 알림 워처(`signal-watcher`)가 동일한 구현을 소비합니다.

pub mod domain;
pub mod score;

pub use domain::price::PricePoint;
pub use domain::signal::{ScoreSnapshot, SignalAction};
pub use domain::timeframe::Timeframe;
pub use score::{
    checklist_score, FixedPerturbation, PerturbationSource, RandomPerturbation, SCORE_MAX,
    SCORE_MIN,
};

//! 알림 공통 타입.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use signal_core::SignalAction;

/// 알림 우선순위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
    Critical,
}

/// 알림 이벤트.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// 체크리스트 점수가 사용자 임계값을 교차함
    SignalTriggered {
        /// 코인 식별자
        coin: String,
        /// 현재 점수
        score: i32,
        /// 유도된 액션
        action: SignalAction,
        /// 현재 가격
        price: Decimal,
        /// 사용자 임계값
        threshold: i32,
    },
    /// 시스템 오류 (워처 내부 장애 등)
    SystemError {
        /// 발생 컴포넌트
        component: String,
        /// 오류 메시지
        message: String,
    },
}

/// 전송 대상 알림.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// 이벤트 내용
    pub event: NotificationEvent,
    /// 우선순위
    pub priority: NotificationPriority,
    /// 생성 시각
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// 새 알림을 생성합니다.
    pub fn new(event: NotificationEvent, priority: NotificationPriority) -> Self {
        Self {
            event,
            priority,
            timestamp: Utc::now(),
        }
    }

    /// 시그널 알림을 생성합니다.
    pub fn signal(
        coin: impl Into<String>,
        score: i32,
        action: SignalAction,
        price: Decimal,
        threshold: i32,
    ) -> Self {
        Self::new(
            NotificationEvent::SignalTriggered {
                coin: coin.into(),
                score,
                action,
                price,
                threshold,
            },
            NotificationPriority::High,
        )
    }
}

/// 알림 전송 오류.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 채널 비활성화 상태
    #[error("알림 채널 비활성화됨: {0}")]
    Disabled(String),

    /// 전송 실패
    #[error("알림 전송 실패: {0}")]
    Delivery(String),

    /// 설정 오류
    #[error("알림 설정 오류: {0}")]
    Config(String),
}

/// 알림 전송 결과 타입.
pub type NotificationResult = Result<(), NotificationError>;

/// 알림 전송기 인터페이스.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 채널 이름 (로그/이력용).
    fn channel(&self) -> &'static str;

    /// 알림을 전송합니다.
    async fn send(&self, notification: &Notification) -> NotificationResult;
}

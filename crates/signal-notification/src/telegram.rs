//! Telegram 알림 서비스.
//!
//! teloxide Bot API를 통해 시그널 알림을 전송합니다.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, warn};

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationPriority, NotificationResult,
    NotificationSender,
};

/// Telegram 전송 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// 봇 토큰
    pub bot_token: String,
    /// 기본 채팅 ID
    pub chat_id: i64,
    /// 전송 활성화 여부
    pub enabled: bool,
}

impl TelegramConfig {
    /// 새 Telegram 설정을 생성합니다.
    pub fn new(bot_token: String, chat_id: i64) -> Self {
        Self {
            bot_token,
            chat_id,
            enabled: true,
        }
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// - `TELEGRAM_BOT_TOKEN`: 봇 토큰 (없으면 None)
    /// - `TELEGRAM_CHAT_ID`: 기본 채팅 ID
    /// - `TELEGRAM_ENABLED`: 활성화 여부 (기본 true)
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()?
            .parse::<i64>()
            .ok()?;
        let enabled = std::env::var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        Some(Self {
            bot_token,
            chat_id,
            enabled,
        })
    }
}

/// Telegram 알림 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    bot: Bot,
}

impl TelegramSender {
    /// 새 Telegram 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        let bot = Bot::new(&config.bot_token);
        Self { config, bot }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        TelegramConfig::from_env().map(Self::new)
    }

    /// 우선순위 이모지.
    fn priority_emoji(priority: &NotificationPriority) -> &'static str {
        match priority {
            NotificationPriority::Low => "ℹ️",
            NotificationPriority::Normal => "📊",
            NotificationPriority::High => "🚨",
            NotificationPriority::Critical => "🔥",
        }
    }

    /// 알림을 Telegram HTML 메시지로 포맷합니다.
    fn format_message(&self, notification: &Notification) -> String {
        let timestamp = notification.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        let emoji = Self::priority_emoji(&notification.priority);

        match &notification.event {
            NotificationEvent::SignalTriggered {
                coin,
                score,
                action,
                price,
                threshold,
            } => {
                let direction = if action.is_bullish() { "🟢" } else { "🔴" };
                format!(
                    "{emoji} <b>시그널 알림</b> {direction}\n\n\
                     코인: <code>{coin}</code>\n\
                     점수: <b>{score}</b> (임계값 {threshold})\n\
                     액션: <b>{action}</b>\n\
                     가격: ${price}\n\n\
                     <i>{timestamp}</i>"
                )
            }
            NotificationEvent::SystemError { component, message } => {
                format!(
                    "{emoji} <b>시스템 오류</b>\n\n\
                     컴포넌트: <code>{component}</code>\n\
                     내용: {message}\n\n\
                     <i>{timestamp}</i>"
                )
            }
        }
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, notification: &Notification) -> NotificationResult {
        if !self.config.enabled {
            debug!("Telegram 채널 비활성화 상태, 전송 생략");
            return Err(NotificationError::Disabled("telegram".to_string()));
        }

        let text = self.format_message(notification);

        self.bot
            .send_message(ChatId(self.config.chat_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| {
                warn!(error = %e, "Telegram 전송 실패");
                NotificationError::Delivery(e.to_string())
            })?;

        debug!(chat_id = self.config.chat_id, "Telegram 알림 전송 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use signal_core::SignalAction;

    #[test]
    fn test_format_signal_message() {
        let sender = TelegramSender::new(TelegramConfig::new("token".to_string(), 42));
        let notification =
            Notification::signal("bitcoin", 112, SignalAction::StrongBuy, dec!(43000), 105);

        let text = sender.format_message(&notification);
        assert!(text.contains("bitcoin"));
        assert!(text.contains("112"));
        assert!(text.contains("STRONG_BUY"));
        assert!(text.contains("🟢"));
    }

    #[tokio::test]
    async fn test_disabled_channel_short_circuits() {
        let mut config = TelegramConfig::new("token".to_string(), 42);
        config.enabled = false;
        let sender = TelegramSender::new(config);

        let notification =
            Notification::signal("bitcoin", 50, SignalAction::StrongSell, dec!(100), 105);
        let result = sender.send(&notification).await;
        assert!(matches!(result, Err(NotificationError::Disabled(_))));
    }
}

//! 애플리케이션 공유 상태.

use std::sync::Arc;

use sqlx::PgPool;

use signal_market::MarketDataProvider;
use signal_notification::TelegramSender;

/// API 서버 공유 상태.
///
/// 핸들러 간에 Clone으로 전달됩니다. 시세 공급자는 trait 객체로
/// 보관해 테스트에서 Mock 공급자로 교체할 수 있습니다.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 커넥션 풀
    pub db: PgPool,
    /// 시세 데이터 공급자
    pub market: Arc<dyn MarketDataProvider>,
    /// Telegram 전송기 (설정 없으면 None)
    pub telegram: Option<Arc<TelegramSender>>,
}

impl AppState {
    /// 새 상태를 생성합니다.
    pub fn new(
        db: PgPool,
        market: Arc<dyn MarketDataProvider>,
        telegram: Option<Arc<TelegramSender>>,
    ) -> Self {
        Self {
            db,
            market,
            telegram,
        }
    }
}

//! 시그널 대시보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 백테스트, 시그널 점수, 즐겨찾기, 포트폴리오, 알림 규칙
//! 엔드포인트와 Swagger UI(`/docs`)를 제공합니다.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use signal_api::openapi::swagger_ui_router;
use signal_api::routes::create_api_router;
use signal_api::AppState;
use signal_market::{CoinGeckoProvider, MarketDataProvider, MockProvider};
use signal_notification::TelegramSender;

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
    /// DB 최대 커넥션 수
    max_db_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_db_connections: 10,
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            max_db_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_db_connections),
        }
    }

    /// 소켓 주소 반환.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 시세 공급자 선택.
///
/// `USE_MOCK_MARKET=true`면 외부 API 없이 합성 시계열을 사용합니다
/// (개발/데모용).
fn create_market_provider() -> Arc<dyn MarketDataProvider> {
    let use_mock = std::env::var("USE_MOCK_MARKET")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if use_mock {
        info!("Mock 시세 공급자 사용 (USE_MOCK_MARKET=true)");
        Arc::new(MockProvider::new())
    } else {
        Arc::new(CoinGeckoProvider::from_env())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL 환경변수가 설정되지 않았습니다")?;
    let db = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&database_url)
        .await
        .context("데이터베이스 연결 실패")?;
    info!("데이터베이스 연결 완료");

    let market = create_market_provider();

    let telegram = TelegramSender::from_env().map(Arc::new);
    if telegram.is_some() {
        info!("Telegram 전송기 활성화됨");
    }

    let state = AppState::new(db, market, telegram);

    let app = create_api_router()
        .with_state(state)
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = config.socket_addr().context("잘못된 호스트/포트 설정")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("포트 바인딩 실패: {}", addr))?;

    info!("API 서버 시작: http://{} (문서: /docs)", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

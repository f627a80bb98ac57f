//! 시세 데이터 공급자 크레이트.
//!
//! 대시보드의 유일한 외부 시세 의존성인 CoinGecko 스타일
//! `market_chart` 계약을 `MarketDataProvider` trait 뒤로 추상화합니다.
//! 백테스트 실행은 시뮬레이션 루프 시작 전에 단 한 번의 과거 시세
//! 조회만 수행하며, 조회 실패는 재시도 없이 실행 전체를 중단시킵니다.

pub mod error;
pub mod provider;

pub use error::MarketError;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::mock::MockProvider;
pub use provider::MarketDataProvider;

//! ovaldict 공통 크레이트
//!
//! OVAL 정의 타입, 저장소 trait, 에러, 설정, 메트릭 이름을 정의합니다.
//! `ovaldict-store`와 `ovaldict-server`가 이 크레이트를 공유합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, OvalDictError, StartupError, StoreError};

// 설정
pub use config::{OvalDictConfig, StoreErrorPolicy};

// 저장소 trait
pub use store::DefinitionStore;

// 도메인 타입
pub use types::{Definition, LookupKey, Selector};

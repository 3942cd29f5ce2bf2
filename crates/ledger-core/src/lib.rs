//! # Ledger Core
//!
//! 원장 서비스의 핵심 도메인 모델과 공용 인프라를 제공합니다.
//!
//! - 계좌(`Account`) 및 이체(`Transfer`) 모델
//! - 계좌 저장소 계약(`AccountStore`)과 인메모리 구현체
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod store;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use store::{AccountStore, MemoryAccountStore};

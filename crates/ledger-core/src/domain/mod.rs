//! 원장 운영을 위한 도메인 모델.

mod account;
mod transfer;

pub use account::*;
pub use transfer::*;

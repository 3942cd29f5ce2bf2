//! Repository pattern for database operations.
//!
//! `ledger_core::AccountStore`의 PostgreSQL 구현을 제공합니다.

pub mod accounts;

pub use accounts::PgAccountStore;

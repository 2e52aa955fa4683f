//! # リポジトリ
//!
//! 永続化インターフェースとその PostgreSQL 実装を提供する。
//!
//! - **依存性逆転**: ユースケース層はトレイトにのみ依存する
//! - **テスタビリティ**: トレイト経由でインメモリ実装に差し替え可能

pub mod user_repository;

pub use user_repository::{PostgresUserRepository, UserRepository};

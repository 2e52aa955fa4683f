//! # ユースケース層
//!
//! User Service のビジネスロジックを実装する。
//!
//! - **依存性注入**: リポジトリとクライアントを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは入出力の変換のみ行い、判断はユースケースに集約

pub mod user;

pub use user::{USER_NOT_FOUND_MESSAGE, UserUseCaseImpl, UserWithTotal};

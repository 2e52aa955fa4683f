//! # User Service ライブラリ
//!
//! ユーザーレコードの参照・作成・存在確認と、Cost Service から取得した
//! 合計コストの集約を HTTP で提供する。
//!
//! バイナリ（`main.rs`）と統合テストの双方から [`app_builder::build_app`] を
//! 通じて同じルーターを組み立てる。

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;

//! # 外部サービスクライアント
//!
//! User Service から他プロセスへの HTTP 通信を担当する。
//!
//! - [`cost_service`]: 合計コストの取得（リクエスト処理の一部）
//! - [`log_service`]: リクエスト完了レコードの転送（処理後に非同期で実行）

pub mod cost_service;
pub mod log_service;

pub use cost_service::{CostServiceClient, CostServiceClientImpl, CostServiceError};
pub use log_service::{LogServiceClientImpl, LogServiceError, LogSink};

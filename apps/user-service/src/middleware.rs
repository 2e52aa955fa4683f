//! # ミドルウェア
//!
//! - [`request_log`]: リクエスト完了時の Canonical Log Line 出力と外部ログサービスへの転送

pub mod request_log;

pub use request_log::{RequestLogState, log_request};

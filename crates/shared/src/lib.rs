//! # UserHub 共有ユーティリティ
//!
//! このクレートは、UserHub
//! プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, user-service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（tracing 系は `observability` feature）

pub mod canonical_log;
pub mod error_response;
pub mod health;
pub mod observability;

pub use canonical_log::{RequestFailure, RequestLogEntry};
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

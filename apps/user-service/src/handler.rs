//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは入出力の変換のみ行い、判断はユースケースに委譲

pub mod health;
pub mod user;

pub use health::{ReadinessState, health_check, readiness_check, root};
pub use user::{
    UserState,
    UserWithTotalResponse,
    check_exists,
    create_user,
    get_user_with_total,
    list_users,
};

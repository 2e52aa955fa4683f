//! # UserHub ドメイン層
//!
//! ユーザーレコードのドメインモデルと入力検証ルールを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: プリミティブ型をラップし、生成時に検証する
//!   （例: [`user::UserId`], [`user::Birthday`]）
//! - **エンティティ**: 一意の識別子を持つ [`user::User`]
//! - **ドメインエラー**: 入力検証の失敗を [`DomainError`] で表現する
//!
//! ## 依存関係の方向
//!
//! ```text
//! user-service → infra → domain
//!      ↓
//!   shared
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use userhub_domain::user::{NewUserInput, UserId};
//!
//! let input: NewUserInput = serde_json::from_str(
//!     r#"{"id": 10, "first_name": "Test", "last_name": "User", "birthday": "2000-01-01"}"#,
//! )?;
//! let user = input.validate()?;
//! assert_eq!(user.id(), UserId::new(10));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod user;

pub use error::DomainError;

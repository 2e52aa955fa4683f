//! # ドメイン層エラー定義
//!
//! 入力値がビジネスルールに違反した状態を表現するエラー型。
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//!
//! `Validation` のメッセージはそのままクライアントに返されるため、
//! 問題のあるフィールド名を含める。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 数値であるべき ID が数値でない
    /// - 日付として解釈できない
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}

impl DomainError {
    /// バリデーションエラーを生成する
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// クライアントに返すメッセージ
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
        }
    }
}

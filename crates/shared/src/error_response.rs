//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - ボディは `{"error": "<message>"}` の 1 フィールドのみ
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は各サービスの責務（shared に axum 依存を入れない）

use serde::{Deserialize, Serialize};

/// エラーレスポンス
///
/// クライアントに返すエラーボディ。メッセージはハンドラが決定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// メッセージからエラーレスポンスを作成する
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_jsonシリアライズでerrorフィールドのみが出力される() {
        let error = ErrorResponse::new("User not found");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json, serde_json::json!({ "error": "User not found" }));
    }

    #[test]
    fn test_jsonデシリアライズが正しく動作する() {
        let error: ErrorResponse = serde_json::from_str(r#"{"error":"id must be a number"}"#).unwrap();

        assert_eq!(error, ErrorResponse::new("id must be a number"));
    }
}

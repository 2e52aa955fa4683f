//! # User Service エラー定義
//!
//! User Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! エラーレスポンスには [`RequestFailure`] を extension として添付する。
//! リクエストログミドルウェアはこれを読み取り、失敗内容を記録する。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use userhub_domain::{DomainError, user::MISSING_FIELDS_MESSAGE};
use userhub_shared::{ErrorResponse, RequestFailure};

/// User Service で発生するエラー
///
/// 表示メッセージはそのままクライアントへ返す。
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// 入力不正（400）
    #[error("{0}")]
    Validation(String),

    /// リソースが見つからない（404）
    #[error("{0}")]
    NotFound(String),

    /// ID の重複（409）
    #[error("{0}")]
    Conflict(String),

    /// 重複以外の理由で挿入が拒否された（400）
    #[error("{0}")]
    InsertRejected(String),

    /// リポジトリや Cost Service の失敗（500）
    #[error("{0}")]
    Dependency(String),
}

impl UserServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserServiceError::Validation(_) | UserServiceError::InsertRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            UserServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            UserServiceError::Conflict(_) => StatusCode::CONFLICT,
            UserServiceError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for UserServiceError {
    fn from(err: DomainError) -> Self {
        UserServiceError::Validation(err.message().to_string())
    }
}

/// Content-Type が JSON でないボディは空の入力として扱い、必須項目の欠落とする
impl From<JsonRejection> for UserServiceError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                UserServiceError::Validation(MISSING_FIELDS_MESSAGE.to_string())
            }
            other => UserServiceError::Validation(other.body_text()),
        }
    }
}

impl IntoResponse for UserServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "依存先の処理に失敗しました");
        }

        let mut response = (status, Json(ErrorResponse::new(message.clone()))).into_response();
        response
            .extensions_mut()
            .insert(RequestFailure::new(status.as_u16(), message));
        response
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(UserServiceError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
    #[case(UserServiceError::InsertRejected("bad".into()), StatusCode::BAD_REQUEST)]
    #[case(UserServiceError::NotFound("none".into()), StatusCode::NOT_FOUND)]
    #[case(UserServiceError::Conflict("dup".into()), StatusCode::CONFLICT)]
    #[case(UserServiceError::Dependency("down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_エラー種別ごとのステータス(#[case] err: UserServiceError, #[case] expected: StatusCode) {
        assert_eq!(err.status(), expected);
    }

    #[tokio::test]
    async fn test_レスポンスにエラーボディとrequest_failureが付与される() {
        let response = UserServiceError::NotFound("User not found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.extensions().get::<RequestFailure>(),
            Some(&RequestFailure::new(404, "User not found"))
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "User not found" }));
    }

    #[test]
    fn test_domain_errorはvalidationに変換される() {
        let err: UserServiceError = DomainError::validation("id must be a number").into();

        assert!(matches!(err, UserServiceError::Validation(msg) if msg == "id must be a number"));
    }
}

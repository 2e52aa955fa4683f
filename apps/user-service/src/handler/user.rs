//! # ユーザーハンドラ
//!
//! ユーザーの一覧・作成・存在確認・合計コスト付き取得を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/users` - ユーザー一覧
//! - `POST /api/add` - ユーザー作成
//! - `GET /api/exists/{id}` - 存在確認
//! - `GET /api/{id}`（別名 `GET /api/users/{id}`） - 合計コスト付きユーザー取得

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path,
        State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use userhub_domain::user::{INVALID_PATH_ID_MESSAGE, NewUserInput, User, UserId};

use crate::{
    error::UserServiceError,
    usecase::{USER_NOT_FOUND_MESSAGE, UserUseCaseImpl, UserWithTotal},
};

/// ユーザーハンドラの State
pub struct UserState {
    pub usecase: UserUseCaseImpl,
}

// --- レスポンス型 ---

/// 存在確認レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// 合計コスト付きユーザーレスポンス
///
/// フィールドはこの順序でシリアライズされる。
#[derive(Debug, Serialize, Deserialize)]
pub struct UserWithTotalResponse {
    pub first_name: String,
    pub last_name:  String,
    pub id:         UserId,
    pub total:      f64,
}

impl From<UserWithTotal> for UserWithTotalResponse {
    fn from(value: UserWithTotal) -> Self {
        Self {
            first_name: value.user.first_name().to_string(),
            last_name:  value.user.last_name().to_string(),
            id:         value.user.id(),
            total:      value.total,
        }
    }
}

// --- ハンドラ ---

/// GET /api/users
///
/// ## レスポンス
///
/// - `200 OK`: ユーザー一覧（リポジトリの自然順）
/// - `500 Internal Server Error`: リポジトリの失敗
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<Arc<UserState>>,
) -> Result<Json<Vec<User>>, UserServiceError> {
    let users = state.usecase.list_users().await?;
    Ok(Json(users))
}

/// POST /api/add
///
/// ## レスポンス
///
/// - `201 Created`: 作成したユーザー
/// - `400 Bad Request`: 入力不正、または重複以外の挿入失敗
/// - `409 Conflict`: ID の重複
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<Arc<UserState>>,
    payload: Result<Json<NewUserInput>, JsonRejection>,
) -> Result<impl IntoResponse, UserServiceError> {
    let Json(input) = payload?;
    let user = state.usecase.create_user(input).await?;

    tracing::info!(id = %user.id(), "ユーザーを作成しました");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/exists/{id}
///
/// ## レスポンス
///
/// - `200 OK`: `{ "exists": bool }`
/// - `400 Bad Request`: ID が数値でない
/// - `500 Internal Server Error`: リポジトリの失敗
///
/// 整数で表せない数値（`1.5` など）はリポジトリに問い合わせず `false` を返す。
#[tracing::instrument(skip_all)]
pub async fn check_exists(
    State(state): State<Arc<UserState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ExistsResponse>, UserServiceError> {
    let Some(id) = parse_path_id(path)? else {
        return Ok(Json(ExistsResponse { exists: false }));
    };
    let exists = state.usecase.user_exists(id).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// GET /api/{id}
///
/// ## レスポンス
///
/// - `200 OK`: `{ first_name, last_name, id, total }`
/// - `400 Bad Request`: ID が数値でない
/// - `404 Not Found`: ユーザーが存在しない
/// - `500 Internal Server Error`: リポジトリまたは Cost Service の失敗
#[tracing::instrument(skip_all)]
pub async fn get_user_with_total(
    State(state): State<Arc<UserState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UserWithTotalResponse>, UserServiceError> {
    let id = parse_path_id(path)?
        .ok_or_else(|| UserServiceError::NotFound(USER_NOT_FOUND_MESSAGE.to_string()))?;
    let result = state.usecase.get_user_with_total(id).await?;
    Ok(Json(result.into()))
}

/// パスパラメータの ID を解釈する
///
/// デコードできないパス（不正な UTF-8 など）も数値でない ID として扱う。
fn parse_path_id(
    path: Result<Path<String>, PathRejection>,
) -> Result<Option<UserId>, UserServiceError> {
    let Path(raw_id) =
        path.map_err(|_| UserServiceError::Validation(INVALID_PATH_ID_MESSAGE.to_string()))?;
    UserId::parse_path(&raw_id).map_err(UserServiceError::from)
}

//! # ヘルスチェックハンドラ
//!
//! User Service の稼働状態を確認するためのエンドポイント。
//!
//! - `/` — 稼働メッセージ（テキスト）
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（DB の接続状態を確認）

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use userhub_infra::db;
use userhub_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// ルートパスで返す稼働メッセージ
pub const ROOT_MESSAGE: &str = "User REST API is running";

const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// User Service のヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub pool: PgPool,
}

/// User Service の Readiness Check エンドポイント
///
/// DB 接続 OK → 200、失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let mut checks = HashMap::new();
    checks.insert("database".to_string(), check_database(&state.pool).await);

    let response = ReadinessResponse::from_checks(checks);
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

/// DB への接続を `SELECT 1` で確認する（タイムアウト: 5 秒）
async fn check_database(pool: &PgPool) -> CheckStatus {
    match tokio::time::timeout(DATABASE_CHECK_TIMEOUT, db::ping(pool)).await {
        Ok(true) => CheckStatus::Ok,
        Ok(false) => {
            tracing::warn!("readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database check timed out");
            CheckStatus::Error
        }
    }
}

//! # User Service アプリケーション構築
//!
//! DI（ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中し、統合テストも
//! 同じルーターを使用する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use userhub_infra::repository::UserRepository;

use crate::{
    client::{CostServiceClient, LogSink},
    handler::{
        ReadinessState,
        UserState,
        check_exists,
        create_user,
        get_user_with_total,
        health_check,
        list_users,
        readiness_check,
        root,
    },
    middleware::{RequestLogState, log_request},
    usecase::UserUseCaseImpl,
};

/// ルーター構築に必要な依存
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository>,
    pub cost_client:     Arc<dyn CostServiceClient>,
    /// Readiness Check で疎通確認する接続プール
    pub pool:            PgPool,
    pub service_name:    String,
    pub log_sink:        Option<Arc<dyn LogSink>>,
}

/// DI コンテナの構築とルーター定義を行う
///
/// `/api/users/{id}` は `/api/{id}` の別名。`/api/add` は POST のみ受け付ける。
pub fn build_app(state: AppState) -> Router {
    let user_state = Arc::new(UserState {
        usecase: UserUseCaseImpl::new(state.user_repository, state.cost_client),
    });
    let readiness_state = Arc::new(ReadinessState { pool: state.pool });
    let request_log_state = RequestLogState {
        service_name: state.service_name,
        sink:         state.log_sink,
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .route("/api/users", get(list_users))
        .route("/api/add", post(create_user))
        .route("/api/exists/{id}", get(check_exists))
        .route("/api/users/{id}", get(get_user_with_total))
        .route("/api/{id}", get(get_user_with_total))
        .with_state(user_state)
        .layer(from_fn_with_state(request_log_state, log_request))
        .layer(TraceLayer::new_for_http())
}

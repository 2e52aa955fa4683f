//! # リクエストログミドルウェア
//!
//! 全リクエストについて、レスポンス確定後に [`RequestLogEntry`] を組み立て、
//! Canonical Log Line として出力する。ログサービスが設定されていれば、
//! 同じレコードを切り離したタスクで転送する。
//!
//! ハンドラの失敗内容はレスポンス extensions の [`RequestFailure`] から読み取る。
//! ヘルスチェックパスは対象外。

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use userhub_shared::{
    RequestFailure,
    RequestLogEntry,
    canonical_log::{CompletedRequest, emit_canonical_log_line, is_health_check_path},
};

use crate::client::LogSink;

/// リクエストログミドルウェアの State
#[derive(Clone)]
pub struct RequestLogState {
    /// レコードに記録するサービス名
    pub service_name: String,
    /// 転送先。`None` ならローカル出力のみ
    pub sink:         Option<Arc<dyn LogSink>>,
}

/// リクエストログミドルウェア
///
/// レスポンスは変更せずにそのまま返す。
pub async fn log_request(
    State(state): State<RequestLogState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_health_check_path(&path) {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or(path);

    let response = next.run(request).await;

    let entry = RequestLogEntry::from_completed(
        CompletedRequest {
            service:  &state.service_name,
            method:   &method,
            url:      &url,
            endpoint: &endpoint,
            status:   response.status().as_u16(),
            elapsed:  started.elapsed(),
            failure:  response.extensions().get::<RequestFailure>(),
        },
        Utc::now(),
    );
    emit_canonical_log_line(&entry);

    if let Some(sink) = state.sink {
        tokio::spawn(async move {
            if let Err(e) = sink.send(&entry).await {
                tracing::error!(error = %e, "ログサービスへの送信に失敗しました");
            }
        });
    }

    response
}

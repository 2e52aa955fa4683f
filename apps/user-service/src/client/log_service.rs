//! # ログサービスクライアント
//!
//! リクエスト完了レコードを外部ログサービスへ転送する。
//!
//! ## エンドポイント
//!
//! - `POST /api/logs` - [`RequestLogEntry`] を JSON で送信
//!
//! 転送はリクエスト処理とは切り離して実行され、失敗してもレスポンスには
//! 影響しない。

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use userhub_shared::RequestLogEntry;

/// 1 回の送信の期限
pub const LOG_SERVICE_TIMEOUT: Duration = Duration::from_millis(1500);

/// ログサービスクライアントエラー
#[derive(Debug, Error)]
pub enum LogServiceError {
    #[error("ログサービスへの送信がタイムアウトしました")]
    Timeout,

    #[error("ログサービスがエラーを返しました: HTTP {0}")]
    Remote(u16),

    #[error("ネットワークエラー: {0}")]
    Network(#[from] reqwest::Error),
}

/// ログ送信先トレイト
///
/// テスト時には記録用のスタブを使用できる。
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn send(&self, entry: &RequestLogEntry) -> Result<(), LogServiceError>;
}

/// ログサービスクライアント実装
#[derive(Clone)]
pub struct LogServiceClientImpl {
    endpoint: String,
    client:   reqwest::Client,
    timeout:  Duration,
}

impl LogServiceClientImpl {
    /// 新しい LogServiceClient を作成する
    ///
    /// `base_url` の末尾の `/` は除去する。
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/logs", base_url.trim_end_matches('/')),
            client:   reqwest::Client::new(),
            timeout:  LOG_SERVICE_TIMEOUT,
        }
    }

    async fn post(&self, entry: &RequestLogEntry) -> Result<(), LogServiceError> {
        let response = self.client.post(&self.endpoint).json(entry).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogServiceError::Remote(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl LogSink for LogServiceClientImpl {
    async fn send(&self, entry: &RequestLogEntry) -> Result<(), LogServiceError> {
        tokio::time::timeout(self.timeout, self.post(entry))
            .await
            .map_err(|_| LogServiceError::Timeout)?
    }
}

//! # Cost Service クライアント
//!
//! User Service から Cost Service への通信を担当する。
//!
//! ## エンドポイント
//!
//! - `GET /total/{user_id}` - ユーザーの合計コストを取得（`{ "total": number }`）
//!
//! ## タイムアウト
//!
//! 送信からボディ読み込みまでの全体を [`tokio::time::timeout`] で囲む。
//! 期限切れ時は実行中のリクエスト Future がドロップされ、reqwest は
//! その時点で接続を破棄する。リトライは行わない。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use thiserror::Error;
use userhub_domain::user::UserId;

/// Cost Service クライアントエラー
#[derive(Debug, Clone, Error)]
pub enum CostServiceError {
    /// ベース URL が設定されていない
    #[error("COST_SERVICE_URL is not configured")]
    NotConfigured,

    /// 期限内に応答がなかった
    #[error("Cost service request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// 成功以外のステータスが返された
    #[error("{}", remote_message(.status, .body))]
    Remote { status: u16, body: String },

    /// 成功レスポンスに数値の `total` が含まれない
    #[error("Cost service returned invalid response (expected {{ total: number }})")]
    InvalidResponse,

    /// ネットワークエラー
    #[error("Cost service request failed: {0}")]
    Network(String),
}

fn remote_message(status: &u16, body: &str) -> String {
    format!("Cost service error: HTTP {status}. {body}")
        .trim()
        .to_string()
}

impl From<reqwest::Error> for CostServiceError {
    fn from(err: reqwest::Error) -> Self {
        CostServiceError::Network(err.to_string())
    }
}

/// Cost Service クライアントトレイト
///
/// テスト時にはスタブを使用できる。
#[async_trait]
pub trait CostServiceClient: Send + Sync {
    /// ユーザーの合計コストを取得する
    ///
    /// 呼び出しごとに Cost Service へ問い合わせる（キャッシュしない）。
    async fn get_total(&self, user_id: UserId) -> Result<f64, CostServiceError>;
}

/// `GET /total/{id}` の成功レスポンス
#[derive(Debug, Deserialize)]
struct TotalResponse {
    total: serde_json::Value,
}

/// Cost Service クライアント実装
#[derive(Clone)]
pub struct CostServiceClientImpl {
    base_url: Option<String>,
    client:   reqwest::Client,
    timeout:  Duration,
}

impl CostServiceClientImpl {
    /// 新しい CostServiceClient を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: Cost Service のベース URL（例: `http://localhost:4000`）。
    ///   末尾の `/` は除去する。`None` の場合は呼び出し時に
    ///   [`CostServiceError::NotConfigured`] を返す
    /// - `timeout`: 1 回の呼び出し全体の期限
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn fetch_total(&self, url: &str) -> Result<f64, CostServiceError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        handle_response(response).await
    }
}

/// レスポンスを合計コストに変換する
///
/// エラーボディの読み込みに失敗した場合は空文字列として扱う。
async fn handle_response(response: reqwest::Response) -> Result<f64, CostServiceError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CostServiceError::Remote {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await?;
    parse_total(&body)
}

fn parse_total(body: &[u8]) -> Result<f64, CostServiceError> {
    let parsed: TotalResponse =
        serde_json::from_slice(body).map_err(|_| CostServiceError::InvalidResponse)?;

    match parsed.total {
        serde_json::Value::Number(n) => n.as_f64().ok_or(CostServiceError::InvalidResponse),
        _ => Err(CostServiceError::InvalidResponse),
    }
}

#[async_trait]
impl CostServiceClient for CostServiceClientImpl {
    #[tracing::instrument(skip_all, fields(%user_id))]
    async fn get_total(&self, user_id: UserId) -> Result<f64, CostServiceError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(CostServiceError::NotConfigured)?;
        let url = format!("{base_url}/total/{user_id}");

        match tokio::time::timeout(self.timeout, self.fetch_total(&url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Cost Service の応答がタイムアウトしました"
                );
                Err(CostServiceError::Timeout(self.timeout))
            }
        }
    }
}

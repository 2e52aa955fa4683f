//! # User Service 設定
//!
//! 環境変数から User Service サーバーの設定を読み込む。
//!
//! | 変数名 | 必須 | デフォルト |
//! |--------|------|-----------|
//! | `USER_SERVICE_HOST` | No | `0.0.0.0` |
//! | `USER_SERVICE_PORT` | No | `3000` |
//! | `DATABASE_URL` | **Yes** | - |
//! | `COST_SERVICE_URL` | No | 未設定時は合計コスト取得が 500 になる |
//! | `COST_SERVICE_TIMEOUT_MS` | No | `10000` |
//! | `LOG_SERVICE_URL` | No | 未設定時はログ転送しない |
//! | `SERVICE_NAME` | No | `unknown-service` |

use std::{env, time::Duration};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SERVICE_NAME: &str = "unknown-service";
/// Cost Service 呼び出しのデフォルトタイムアウト（ミリ秒）
pub const DEFAULT_COST_SERVICE_TIMEOUT_MS: u64 = 10_000;

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// User Service サーバーの設定
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// Cost Service のベース URL
    pub cost_service_url: Option<String>,
    /// Cost Service 呼び出しのタイムアウト
    pub cost_service_timeout: Duration,
    /// リクエストログの転送先（外部ログサービス）
    pub log_service_url: Option<String>,
    /// ログに記録するサービス名
    pub service_name: String,
}

impl UserServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("USER_SERVICE_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid {
                    name: "USER_SERVICE_PORT",
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        let timeout_ms = match get("COST_SERVICE_TIMEOUT_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Invalid {
                    name: "COST_SERVICE_TIMEOUT_MS",
                    value,
                })?,
            None => DEFAULT_COST_SERVICE_TIMEOUT_MS,
        };

        Ok(Self {
            host: get("USER_SERVICE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            cost_service_url: get("COST_SERVICE_URL"),
            cost_service_timeout: Duration::from_millis(timeout_ms),
            log_service_url: get("LOG_SERVICE_URL"),
            service_name: get("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        })
    }
}

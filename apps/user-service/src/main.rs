//! # User Service サーバー
//!
//! ユーザーレコードの参照・作成・存在確認と、Cost Service から取得した
//! 合計コストの集約を提供する HTTP サーバー。
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │    Client    │────▶│ User Service │────▶│ Cost Service │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                         │        ╎
//!                         ▼        ╎（任意・非同期）
//!                  ┌──────────┐  ┌──────────────┐
//!                  │PostgreSQL│  │ Log Service  │
//!                  └──────────┘  └──────────────┘
//! ```
//!
//! 環境変数は [`userhub_user_service::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p userhub-user-service
//!
//! # 本番環境
//! DATABASE_URL=postgres://... COST_SERVICE_URL=http://cost:4000 \
//!   cargo run -p userhub-user-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use userhub_infra::{db, repository::PostgresUserRepository};
use userhub_shared::observability::{TracingConfig, init_tracing};
use userhub_user_service::{
    app_builder::{AppState, build_app},
    client::{CostServiceClientImpl, LogServiceClientImpl, LogSink},
    config::UserServiceConfig,
};

/// User Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // 設定読み込み
    let config = UserServiceConfig::from_env().context("設定の読み込みに失敗しました")?;

    // トレーシング初期化
    init_tracing(TracingConfig::from_env(config.service_name.clone()));

    tracing::info!(
        "User Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;

    if config.cost_service_url.is_none() {
        tracing::warn!("COST_SERVICE_URL が未設定のため、合計コスト付き取得は 500 を返します");
    }

    // 依存コンポーネントを初期化
    let log_sink = config
        .log_service_url
        .as_deref()
        .map(|url| Arc::new(LogServiceClientImpl::new(url)) as Arc<dyn LogSink>);

    let app = build_app(AppState {
        user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
        cost_client: Arc::new(CostServiceClientImpl::new(
            config.cost_service_url.as_deref(),
            config.cost_service_timeout,
        )),
        pool,
        service_name: config.service_name.clone(),
        log_sink,
    });

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("User Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

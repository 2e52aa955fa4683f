//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **挿入時の一意性保証**: 存在確認と挿入は別操作のため、同一 ID の
//!   同時作成は主キー制約で検出し [`InfraError::duplicate_key`] に変換する
//! - **実行時クエリ**: `sqlx::query_as` + `FromRow` を使用し、
//!   ビルド時にデータベースを必要としない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use userhub_domain::user::{Birthday, PersonName, User, UserId};

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// ユーザーは作成のみ行い、更新・削除は提供しない。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 全ユーザーを取得する
    ///
    /// 順序は保証しない。
    async fn find_all(&self) -> Result<Vec<User>, InfraError>;

    /// ID でユーザーを検索する
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError>;

    /// ID のユーザーが存在するか
    async fn exists_by_id(&self, id: UserId) -> Result<bool, InfraError>;

    /// ユーザーを挿入し、保存された内容を返す
    ///
    /// # エラー
    ///
    /// 同じ ID のユーザーが既に存在する場合は
    /// [`InfraErrorKind::DuplicateKey`](crate::InfraErrorKind::DuplicateKey)。
    async fn insert(&self, user: &User) -> Result<User, InfraError>;
}

/// `users` テーブルの行
#[derive(Debug, FromRow)]
struct UserRow {
    id:         i64,
    first_name: String,
    last_name:  String,
    birthday:   DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::new(
            UserId::new(row.id),
            PersonName::new(row.first_name).map_err(|e| InfraError::unexpected(e.to_string()))?,
            PersonName::new(row.last_name).map_err(|e| InfraError::unexpected(e.to_string()))?,
            Birthday::from_datetime(row.birthday),
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<User>, InfraError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, birthday
            FROM users
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, birthday
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn exists_by_id(&self, id: UserId) -> Result<bool, InfraError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(id.as_i64())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %user.id()))]
    async fn insert(&self, user: &User) -> Result<User, InfraError> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, first_name, last_name, birthday)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, birthday
            "#,
        )
        .bind(user.id().as_i64())
        .bind(user.first_name().as_str())
        .bind(user.last_name().as_str())
        .bind(user.birthday().as_datetime())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => User::try_from(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(InfraError::duplicate_key("User", user.id().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

//! # テスト用インメモリリポジトリ
//!
//! ユースケース・ハンドラのテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! userhub-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use userhub_domain::user::{User, UserId};

use crate::{error::InfraError, repository::UserRepository};

/// インメモリ実装の UserRepository
///
/// 挿入順を保持する。存在確認と書き込みを 1 回のロック内で行うため、同一 ID の同時挿入は
/// PostgreSQL 実装と同じく片方だけが成功する。
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users:   Arc<Mutex<Vec<User>>>,
    failing: Option<String>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全操作が指定メッセージの [`InfraError`] を返すリポジトリを作成する
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            users:   Arc::default(),
            failing: Some(message.into()),
        }
    }

    /// 初期データを追加する
    pub fn with_users(self, users: impl IntoIterator<Item = User>) -> Self {
        {
            let mut stored = self.users.lock().unwrap();
            for user in users {
                if !stored.iter().any(|u| u.id() == user.id()) {
                    stored.push(user);
                }
            }
        }
        self
    }

    /// 保存されているユーザー数
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_failing(&self) -> Result<(), InfraError> {
        match &self.failing {
            Some(message) => Err(InfraError::unexpected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, InfraError> {
        self.check_failing()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError> {
        self.check_failing()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn exists_by_id(&self, id: UserId) -> Result<bool, InfraError> {
        self.check_failing()?;
        Ok(self.users.lock().unwrap().iter().any(|u| u.id() == id))
    }

    async fn insert(&self, user: &User) -> Result<User, InfraError> {
        self.check_failing()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id() == user.id()) {
            return Err(InfraError::duplicate_key("User", user.id().to_string()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }
}

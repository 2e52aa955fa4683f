//! ユーザーユースケース
//!
//! リポジトリと Cost Service クライアントを組み合わせ、結果を
//! [`UserServiceError`] に分類する。リトライは行わない。

use std::sync::Arc;

use userhub_domain::user::{NewUserInput, User, UserId};
use userhub_infra::repository::UserRepository;

use crate::{client::CostServiceClient, error::UserServiceError};

/// 作成前の存在確認で既存ユーザーが見つかった場合のメッセージ
pub const USER_ALREADY_EXISTS_MESSAGE: &str = "User already exists";
/// 挿入時の一意制約違反（存在確認後に割り込まれた場合）のメッセージ
pub const DUPLICATE_ID_MESSAGE: &str = "User with this id already exists";
/// ユーザーが見つからない場合のメッセージ
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// ユーザーと合計コスト
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithTotal {
    pub user:  User,
    pub total: f64,
}

/// ユーザーユースケース
pub struct UserUseCaseImpl {
    user_repository: Arc<dyn UserRepository>,
    cost_client:     Arc<dyn CostServiceClient>,
}

impl UserUseCaseImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        cost_client: Arc<dyn CostServiceClient>,
    ) -> Self {
        Self {
            user_repository,
            cost_client,
        }
    }

    /// 全ユーザーを取得する
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        self.user_repository
            .find_all()
            .await
            .map_err(|e| UserServiceError::Dependency(e.detail()))
    }

    /// ユーザーを作成する
    ///
    /// 1. 入力検証（必須項目 → ID → 誕生日）
    /// 2. 存在確認（既存なら 409）
    /// 3. 挿入（一意制約違反なら 409、それ以外の失敗は 400）
    ///
    /// 存在確認は不要な挿入を避けるためのもので、一意性は挿入で保証される。
    pub async fn create_user(&self, input: NewUserInput) -> Result<User, UserServiceError> {
        let user = input.validate()?;

        let exists = self
            .user_repository
            .exists_by_id(user.id())
            .await
            .map_err(|e| UserServiceError::InsertRejected(e.detail()))?;
        if exists {
            return Err(UserServiceError::Conflict(
                USER_ALREADY_EXISTS_MESSAGE.to_string(),
            ));
        }

        self.user_repository.insert(&user).await.map_err(|e| {
            if e.is_duplicate_key() {
                tracing::info!(id = %user.id(), "存在確認後に同じ ID のユーザーが作成されていました");
                UserServiceError::Conflict(DUPLICATE_ID_MESSAGE.to_string())
            } else {
                UserServiceError::InsertRejected(e.detail())
            }
        })
    }

    /// ユーザーが存在するか確認する
    pub async fn user_exists(&self, id: UserId) -> Result<bool, UserServiceError> {
        self.user_repository
            .exists_by_id(id)
            .await
            .map_err(|e| UserServiceError::Dependency(e.detail()))
    }

    /// ユーザーと合計コストを取得する
    ///
    /// ユーザーが存在しない場合は Cost Service を呼び出さない。
    /// 合計コストの取得に失敗した場合は部分的な結果を返さない。
    pub async fn get_user_with_total(&self, id: UserId) -> Result<UserWithTotal, UserServiceError> {
        let user = self
            .user_repository
            .find_by_id(id)
            .await
            .map_err(|e| UserServiceError::Dependency(e.detail()))?
            .ok_or_else(|| UserServiceError::NotFound(USER_NOT_FOUND_MESSAGE.to_string()))?;

        let total = self.cost_client.get_total(id).await.map_err(|e| {
            tracing::warn!(error = %e, %id, "合計コストの取得に失敗しました");
            UserServiceError::Dependency(e.to_string())
        })?;

        Ok(UserWithTotal { user, total })
    }
}

use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    auth::Identity,
    id::UserId,
    user::{
        event::{CompleteOnboarding, UpdateOrganizerProfile},
        User,
    },
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    // 検証済みアイデンティティをローカルのユーザーに解決する。
    // 初回は作成し、プロフィールに差分があれば取り込む冪等な upsert。
    async fn resolve_or_create(&self, identity: Identity) -> AppResult<User>;
    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>>;
    async fn complete_onboarding(&self, event: CompleteOnboarding) -> AppResult<()>;
    async fn update_organizer_profile(&self, event: UpdateOrganizerProfile) -> AppResult<()>;
}

use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::auth::{AccessToken, Identity};

#[async_trait]
pub trait AuthRepository: Send + Sync {
    // セッショントークンを検証済みアイデンティティに解決する。
    // 資格情報の検証そのものは外部のプロバイダーに委ねる
    async fn verify_session(&self, access_token: &AccessToken) -> AppResult<Identity>;
}

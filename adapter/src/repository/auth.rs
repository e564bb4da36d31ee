use async_trait::async_trait;
use kernel::model::auth::{AccessToken, Identity};
use kernel::repository::auth::AuthRepository;
use serde::Deserialize;
use shared::{
    config::IdentityProviderConfig,
    error::{AppError, AppResult},
};
use std::sync::Arc;

use crate::redis::{
    model::{RedisKey, RedisValue},
    RedisClient,
};

pub struct AuthRepositoryImpl {
    kv: Arc<RedisClient>,
    http: reqwest::Client,
    provider: IdentityProviderConfig,
    ttl: u64,
}

impl AuthRepositoryImpl {
    pub fn new(kv: Arc<RedisClient>, provider: IdentityProviderConfig, ttl: u64) -> Self {
        Self {
            kv,
            http: reqwest::Client::new(),
            provider,
            ttl,
        }
    }
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    // セッショントークンを検証済みアイデンティティに解決する。
    // 検証済みの結果は TTL 付きで Redis にキャッシュし、
    // キャッシュミス時のみプロバイダーのセッション照会 API を呼ぶ
    async fn verify_session(&self, access_token: &AccessToken) -> AppResult<Identity> {
        let key = SessionKey(access_token.clone());

        if let Some(cached) = self.kv.get(&key).await? {
            return Ok(cached.0);
        }

        let url = format!("{}/v1/sessions/{}", self.provider.base_url, access_token.0);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.provider.secret_key)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("セッション照会に失敗しました: {e}"))
            })?;

        // プロバイダーが知らないトークンは未認証として扱う
        if res.status() == reqwest::StatusCode::NOT_FOUND
            || res.status() == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AppError::UnauthenticatedError);
        }
        if !res.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "セッション照会が失敗しました: {}",
                res.status()
            )));
        }

        let session: ProviderSession = res.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("セッション応答を解釈できません: {e}"))
        })?;
        let identity = Identity::from(session);

        self.kv
            .set_ex(&key, &CachedIdentity(identity.clone()), self.ttl)
            .await?;

        Ok(identity)
    }
}

// プロバイダーのセッション照会 API が返すペイロード
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderSession {
    subject: String,
    name: Option<String>,
    email: Option<String>,
    picture_url: Option<String>,
}

impl From<ProviderSession> for Identity {
    fn from(value: ProviderSession) -> Self {
        let ProviderSession {
            subject,
            name,
            email,
            picture_url,
        } = value;
        Identity {
            subject,
            name,
            email,
            picture_url,
        }
    }
}

struct SessionKey(AccessToken);

impl RedisKey for SessionKey {
    type Value = CachedIdentity;

    fn inner(&self) -> String {
        format!("session:{}", self.0 .0)
    }
}

pub struct CachedIdentity(pub Identity);

impl RedisValue for CachedIdentity {
    fn inner(&self) -> String {
        serde_json::to_string(&self.0).expect("failed to serialize identity")
    }
}

impl TryFrom<String> for CachedIdentity {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let identity: Identity = serde_json::from_str(&value).map_err(|e| {
            AppError::ConversionEntityError(format!("キャッシュ済みセッションが不正です: {e}"))
        })?;
        Ok(Self(identity))
    }
}

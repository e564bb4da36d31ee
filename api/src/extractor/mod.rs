use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use kernel::model::{auth::AccessToken, id::UserId, user::User};
use registry::AppRegistry;
use shared::error::AppError;

pub struct AuthorizedUser {
    pub access_token: AccessToken,
    pub user: User,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.user.user_id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        // Bearer トークンを取り出す
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::UnauthorizedError)?;
        let access_token = AccessToken(bearer.token().to_string());

        // プロバイダー検証済みのアイデンティティに解決する
        let identity = registry
            .auth_repository()
            .verify_session(&access_token)
            .await?;

        // 初回アクセスならユーザーを作成し、プロフィールの差分があれば取り込む
        let user = registry
            .user_repository()
            .resolve_or_create(identity)
            .await?;

        Ok(Self { access_token, user })
    }
}

// 未認証でも呼べるエンドポイント用。認証に失敗した場合は None になる
pub struct OptionalAuthorizedUser(pub Option<AuthorizedUser>);

#[axum::async_trait]
impl FromRequestParts<AppRegistry> for OptionalAuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(
            AuthorizedUser::from_request_parts(parts, registry)
                .await
                .ok(),
        ))
    }
}

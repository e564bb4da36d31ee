use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

// 外部のアイデンティティプロバイダーが検証済みのアサーション。
// 認証情報そのものの検証はこのアプリケーションでは行わない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
}

use anyhow::Result;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub identity: IdentityProviderConfig,
    pub event: EventConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: std::env::var("REDIS_HOST")?,
            port: std::env::var("REDIS_PORT")?.parse()?,
        };
        let auth = AuthConfig {
            ttl: std::env::var("AUTH_TOKEN_TTL")?.parse()?,
        };
        let identity = IdentityProviderConfig {
            base_url: std::env::var("IDENTITY_PROVIDER_URL")?,
            secret_key: std::env::var("IDENTITY_PROVIDER_SECRET")?,
        };
        let event = EventConfig {
            // 無料イベントの作成上限。未指定時は 1
            free_event_limit: std::env::var("FREE_EVENT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        };
        Ok(Self {
            database,
            redis,
            auth,
            identity,
            event,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    pub ttl: u64,
}

#[derive(Clone)]
pub struct IdentityProviderConfig {
    pub base_url: String,
    pub secret_key: String,
}

pub struct EventConfig {
    pub free_event_limit: i32,
}

use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    auth::Identity,
    id::UserId,
    user::{
        event::{CompleteOnboarding, UpdateOrganizerProfile},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::user::UserRow, ConnectionPool};

const USER_COLUMNS: &str = r#"
    user_id,
    subject_id,
    name,
    email,
    image_url,
    has_completed_onboarding,
    free_events_created,
    location_city,
    location_state,
    location_country,
    location_lat,
    location_lng,
    interests,
    organizer_bio,
    organizer_website,
    organizer_twitter,
    organizer_instagram,
    organizer_linkedin,
    created_at,
    updated_at
"#;

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    // アイデンティティプロバイダーのサブジェクト ID をキーにした冪等な upsert。
    // - 初見のサブジェクトならデフォルト値でユーザーを作成する
    // - 既知のサブジェクトでプロフィールに差分があれば、その項目だけ取り込み
    //   updated_at を進める。差分がなければ何も書かない
    async fn resolve_or_create(&self, identity: Identity) -> AppResult<User> {
        let name = identity.name.clone().unwrap_or_else(|| "Anonymous".into());
        let email = identity.email.clone().unwrap_or_default();

        let mut tx = self.db.begin().await?;

        let select_sql = format!("SELECT {USER_COLUMNS} FROM users WHERE subject_id = $1");
        let existing: Option<UserRow> = sqlx::query_as(&select_sql)
            .bind(&identity.subject)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        let row = match existing {
            Some(row) => {
                if row.name != name || row.email != email || row.image_url != identity.picture_url
                {
                    let update_sql = format!(
                        r#"
                            UPDATE users
                            SET name = $2, email = $3, image_url = $4, updated_at = NOW()
                            WHERE subject_id = $1
                            RETURNING {USER_COLUMNS}
                        "#
                    );
                    sqlx::query_as(&update_sql)
                        .bind(&identity.subject)
                        .bind(&name)
                        .bind(&email)
                        .bind(&identity.picture_url)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(AppError::SpecificOperationError)?
                } else {
                    row
                }
            }
            None => {
                // 同じサブジェクトの初回アクセスが競合した場合は
                // 挿入に負けた側が既存行を引き直す
                let insert_sql = format!(
                    r#"
                        INSERT INTO users (subject_id, name, email, image_url)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (subject_id) DO NOTHING
                        RETURNING {USER_COLUMNS}
                    "#
                );
                let inserted: Option<UserRow> = sqlx::query_as(&insert_sql)
                    .bind(&identity.subject)
                    .bind(&name)
                    .bind(&email)
                    .bind(&identity.picture_url)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
                match inserted {
                    Some(row) => row,
                    None => sqlx::query_as(&select_sql)
                        .bind(&identity.subject)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(AppError::SpecificOperationError)?,
                }
            }
        };

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(User::from(row))
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(current_user_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(User::from))
    }

    async fn complete_onboarding(&self, event: CompleteOnboarding) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE users
                SET
                    location_city = $2,
                    location_state = $3,
                    location_country = $4,
                    location_lat = $5,
                    location_lng = $6,
                    interests = $7,
                    has_completed_onboarding = TRUE,
                    updated_at = NOW()
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(&event.location.city)
        .bind(&event.location.state)
        .bind(&event.location.country)
        .bind(event.location.lat)
        .bind(event.location.lng)
        .bind(&event.interests)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "対象のユーザーが見つかりませんでした。".into(),
            ));
        }

        Ok(())
    }

    async fn update_organizer_profile(&self, event: UpdateOrganizerProfile) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE users
                SET
                    organizer_bio = $2,
                    organizer_website = $3,
                    organizer_twitter = $4,
                    organizer_instagram = $5,
                    organizer_linkedin = $6,
                    updated_at = NOW()
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(&event.bio)
        .bind(&event.website)
        .bind(&event.social_links.twitter)
        .bind(&event.social_links.instagram)
        .bind(&event.social_links.linkedin)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "対象のユーザーが見つかりませんでした。".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(subject: &str, name: &str, email: &str) -> Identity {
        Identity {
            subject: subject.into(),
            name: Some(name.into()),
            email: Some(email.into()),
            picture_url: None,
        }
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn resolve_or_create_is_an_idempotent_upsert(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        // 初回はデフォルト値で作成される
        let created = repo
            .resolve_or_create(identity("subject-1", "Alice", "alice@example.com"))
            .await?;
        assert_eq!(created.name, "Alice");
        assert_eq!(created.email, "alice@example.com");
        assert!(!created.has_completed_onboarding);
        assert_eq!(created.free_events_created, 0);

        // 同じアサーションをもう一度渡しても同じユーザーに解決される
        let resolved = repo
            .resolve_or_create(identity("subject-1", "Alice", "alice@example.com"))
            .await?;
        assert_eq!(resolved.user_id, created.user_id);

        // プロフィールが変わっていれば差分だけ取り込まれる
        let drifted = repo
            .resolve_or_create(identity("subject-1", "Alice Cooper", "alice@example.com"))
            .await?;
        assert_eq!(drifted.user_id, created.user_id);
        assert_eq!(drifted.name, "Alice Cooper");

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn missing_identity_fields_fall_back_to_defaults(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let user = repo
            .resolve_or_create(Identity {
                subject: "subject-2".into(),
                name: None,
                email: None,
                picture_url: None,
            })
            .await?;

        assert_eq!(user.name, "Anonymous");
        assert_eq!(user.email, "");

        Ok(())
    }
}

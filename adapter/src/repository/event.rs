use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use kernel::model::{
    event::{
        event::{CreateEvent, DeleteEvent, EventListFilter, UpdateEvent},
        generate_slug, Event,
    },
    id::{EventId, UserId},
};
use kernel::repository::event::EventRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::event::{location_columns, ticket_columns, EventRow, TICKET_TYPE_FREE},
    ConnectionPool,
};

// 一覧・詳細の SELECT で共通の抽出カラム。users と JOIN して主催者名も取る
const EVENT_COLUMNS: &str = r#"
    e.event_id,
    e.title,
    e.description,
    e.category,
    e.tags,
    e.start_at,
    e.end_at,
    e.timezone,
    e.location_type,
    e.venue,
    e.address,
    e.city,
    e.state,
    e.country,
    e.online_link,
    e.capacity,
    e.ticket_type,
    e.ticket_price,
    e.cover_image_url,
    e.theme_color,
    e.slug,
    e.organizer_id,
    u.name AS organizer_name,
    e.registration_count,
    e.created_at,
    e.updated_at
"#;

const DEFAULT_UPCOMING_LIMIT: i64 = 12;

#[derive(new)]
pub struct EventRepositoryImpl {
    db: ConnectionPool,
    free_event_limit: i32,
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        let mut tx = self.db.begin().await?;

        // 無料イベント枠のカウンターを同一トランザクションで読み書きするため、
        // 分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 無料イベントの場合は主催者の作成上限を超えていないか確認する
        if event.ticket.is_free() {
            let free_events_created: Option<i32> =
                sqlx::query_scalar("SELECT free_events_created FROM users WHERE user_id = $1")
                    .bind(event.organizer_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;

            let free_events_created = free_events_created.ok_or_else(|| {
                AppError::EntityNotFound("対象のユーザーが見つかりませんでした。".into())
            })?;

            if free_events_created >= self.free_event_limit {
                return Err(AppError::FreeEventQuotaExceeded);
            }
        }

        let event_id = EventId::new();
        let created_at = Utc::now();
        // タイトルが同じでも作成時刻でスラッグが一意になる
        let slug = generate_slug(&event.title, created_at);
        let (location_type, venue, address, online_link) = location_columns(&event.location);
        let (ticket_type, ticket_price) = ticket_columns(&event.ticket);

        let res = sqlx::query(
            r#"
                INSERT INTO events (
                    event_id, title, description, category, tags,
                    start_at, end_at, timezone,
                    location_type, venue, address, city, state, country, online_link,
                    capacity, ticket_type, ticket_price,
                    cover_image_url, theme_color, slug, organizer_id,
                    registration_count, created_at, updated_at
                )
                VALUES (
                    $1, $2, $3, $4, $5,
                    $6, $7, $8,
                    $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18,
                    $19, $20, $21, $22,
                    0, $23, $23
                )
            "#,
        )
        .bind(event_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.tags)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(&event.timezone)
        .bind(location_type)
        .bind(venue)
        .bind(address)
        .bind(&event.city)
        .bind(&event.state)
        .bind(&event.country)
        .bind(online_link)
        .bind(event.capacity)
        .bind(ticket_type)
        .bind(ticket_price)
        .bind(&event.cover_image_url)
        .bind(&event.theme_color)
        .bind(&slug)
        .bind(event.organizer_id)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No event record has been created".into(),
            ));
        }

        // 無料イベントなら主催者の作成数カウンターを進める
        if event.ticket.is_free() {
            sqlx::query(
                r#"
                    UPDATE users
                    SET free_events_created = free_events_created + 1, updated_at = NOW()
                    WHERE user_id = $1
                "#,
            )
            .bind(event.organizer_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(event_id)
    }

    async fn find_upcoming(&self, filter: EventListFilter) -> AppResult<Vec<Event>> {
        let limit = filter.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
        let sql = format!(
            r#"
                SELECT {EVENT_COLUMNS}
                FROM events AS e
                INNER JOIN users AS u ON e.organizer_id = u.user_id
                WHERE e.start_at >= $1
                  AND ($2::text IS NULL OR e.category = $2)
                  AND ($3::text IS NULL OR e.city = $3)
                ORDER BY e.start_at ASC
                LIMIT $4
            "#
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(Utc::now())
            .bind(&filter.category)
            .bind(&filter.city)
            .bind(limit)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Event>> {
        let sql = format!(
            r#"
                SELECT {EVENT_COLUMNS}
                FROM events AS e
                INNER JOIN users AS u ON e.organizer_id = u.user_id
                WHERE e.slug = $1
            "#
        );
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(slug)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        row.map(Event::try_from).transpose()
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>> {
        let sql = format!(
            r#"
                SELECT {EVENT_COLUMNS}
                FROM events AS e
                INNER JOIN users AS u ON e.organizer_id = u.user_id
                WHERE e.event_id = $1
            "#
        );
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(event_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        row.map(Event::try_from).transpose()
    }

    async fn find_by_organizer(&self, organizer_id: UserId) -> AppResult<Vec<Event>> {
        let sql = format!(
            r#"
                SELECT {EVENT_COLUMNS}
                FROM events AS e
                INNER JOIN users AS u ON e.organizer_id = u.user_id
                WHERE e.organizer_id = $1
                ORDER BY e.created_at DESC
            "#
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(organizer_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn update(&self, event: UpdateEvent) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 対象イベントの存在と所有者を確認する
        self.ensure_owned_by(&mut tx, event.event_id, event.requested_user)
            .await?;

        let res = sqlx::query(
            r#"
                UPDATE events
                SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    category = COALESCE($4, category),
                    start_at = COALESCE($5, start_at),
                    end_at = COALESCE($6, end_at),
                    capacity = COALESCE($7, capacity),
                    cover_image_url = COALESCE($8, cover_image_url),
                    theme_color = COALESCE($9, theme_color),
                    updated_at = NOW()
                WHERE event_id = $1
            "#,
        )
        .bind(event.event_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.capacity)
        .bind(&event.cover_image_url)
        .bind(&event.theme_color)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No event record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn delete(&self, event: DeleteEvent) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 無料イベント枠のカウンターを戻す処理があるため、作成時と同じく
        // 分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        let ticket_type = self
            .ensure_owned_by(&mut tx, event.event_id, event.requested_user)
            .await?;

        // 先にイベントの登録をすべて削除してからイベント本体を削除する
        sqlx::query("DELETE FROM registrations WHERE event_id = $1")
            .bind(event.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        let res = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No event record has been deleted".into(),
            ));
        }

        // 無料イベントだった場合はカウンターを戻す。0 を下回ることはない
        if ticket_type == TICKET_TYPE_FREE {
            sqlx::query(
                r#"
                    UPDATE users
                    SET free_events_created = GREATEST(free_events_created - 1, 0),
                        updated_at = NOW()
                    WHERE user_id = $1
                "#,
            )
            .bind(event.requested_user)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl EventRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // イベントの存在確認と所有者チェック。チケット種別を返す
    async fn ensure_owned_by(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        requested_user: UserId,
    ) -> AppResult<String> {
        let row: Option<(UserId, String)> =
            sqlx::query_as("SELECT organizer_id, ticket_type FROM events WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

        let (organizer_id, ticket_type) = row.ok_or_else(|| {
            AppError::EntityNotFound(format!("イベント（{event_id}）が見つかりませんでした。"))
        })?;

        if organizer_id != requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        Ok(ticket_type)
    }
}

#[cfg(test)]
mod tests {
    use kernel::model::event::{EventLocation, TicketKind};

    use super::*;
    use crate::repository::user::UserRepositoryImpl;
    use kernel::model::auth::Identity;
    use kernel::repository::user::UserRepository;

    async fn fixture_user(pool: &sqlx::PgPool, subject: &str) -> anyhow::Result<UserId> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user = repo
            .resolve_or_create(Identity {
                subject: subject.into(),
                name: Some("Organizer".into()),
                email: Some("organizer@example.com".into()),
                picture_url: None,
            })
            .await?;
        Ok(user.user_id)
    }

    fn draft(organizer_id: UserId, title: &str, ticket: TicketKind) -> CreateEvent {
        let start_at = Utc::now() + chrono::Duration::days(7);
        CreateEvent::new(
            organizer_id,
            title.into(),
            "description".into(),
            "technology".into(),
            vec!["rust".into()],
            start_at,
            start_at + chrono::Duration::hours(3),
            "Asia/Tokyo".into(),
            EventLocation::Physical {
                venue: Some("Shibuya Hall".into()),
                address: None,
            },
            "Tokyo".into(),
            None,
            "Japan".into(),
            100,
            ticket,
            None,
            None,
        )
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn free_event_quota_blocks_the_second_free_event(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "quota-subject").await?;
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool), 1);

        repo.create(draft(organizer_id, "First Free", TicketKind::Free))
            .await?;

        // 2 つ目の無料イベントは上限に弾かれる
        let err = repo
            .create(draft(organizer_id, "Second Free", TicketKind::Free))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FreeEventQuotaExceeded));

        // 有料イベントは上限の対象外
        repo.create(draft(
            organizer_id,
            "Paid One",
            TicketKind::Paid { price: 1500 },
        ))
        .await?;

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn deleting_a_free_event_returns_the_quota(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "delete-subject").await?;
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool), 1);

        let event_id = repo
            .create(draft(organizer_id, "Disposable", TicketKind::Free))
            .await?;

        repo.delete(DeleteEvent {
            event_id,
            requested_user: organizer_id,
        })
        .await?;

        // 削除で枠が戻るので、もう一度無料イベントを作成できる
        repo.create(draft(organizer_id, "Replacement", TicketKind::Free))
            .await?;

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn only_the_owner_can_update_or_delete(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "owner-subject").await?;
        let other_id = fixture_user(&pool, "other-subject").await?;
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool), 1);

        let event_id = repo
            .create(draft(organizer_id, "Owned", TicketKind::Free))
            .await?;

        let err = repo
            .delete(DeleteEvent {
                event_id,
                requested_user: other_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ForbiddenOperation));

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn identical_titles_get_distinct_slugs(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "slug-subject").await?;
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool), 1);

        let first = repo
            .create(draft(
                organizer_id,
                "My Cool Event!!",
                TicketKind::Paid { price: 100 },
            ))
            .await?;
        let second = repo
            .create(draft(
                organizer_id,
                "My Cool Event!!",
                TicketKind::Paid { price: 100 },
            ))
            .await?;

        let first = repo.find_by_id(first).await?.unwrap();
        let second = repo.find_by_id(second).await?.unwrap();
        assert!(first.slug.starts_with("my-cool-event-"));
        assert!(second.slug.starts_with("my-cool-event-"));
        assert_ne!(first.slug, second.slug);

        Ok(())
    }
}

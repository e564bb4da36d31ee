use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use kernel::model::{
    id::{EventId, RegistrationId, UserId},
    registration::{
        evaluate_check_in, event::{CancelRegistration, CreateRegistration}, generate_qr_code,
        CheckInOutcome, CheckInRejection, Registration, RegistrationState, RegistrationStatus,
    },
};
use kernel::repository::registration::RegistrationRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::registration::{parse_status, RegistrationRow, RegistrationStateRow},
    ConnectionPool,
};

#[derive(new)]
pub struct RegistrationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl RegistrationRepository for RegistrationRepositoryImpl {
    // チケットの発行操作を行う
    async fn create(&self, event: CreateRegistration) -> AppResult<RegistrationId> {
        let mut tx = self.db.begin().await?;

        // registration_count の読み書きが同時登録で失われないよう、
        // 分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定のイベント ID をもつイベントが存在するか
        // - 存在した場合、定員に空きがあるか
        // - 同じユーザーの有効な登録がすでにないか
        {
            let event_row: Option<(i32, i32)> = sqlx::query_as(
                r#"
                    SELECT capacity, registration_count
                    FROM events
                    WHERE event_id = $1
                "#,
            )
            .bind(event.event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let (capacity, registration_count) = event_row.ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "イベント（{}）が見つかりませんでした。",
                    event.event_id
                ))
            })?;

            if registration_count >= capacity {
                return Err(AppError::CapacityExceeded);
            }

            // キャンセル済みの登録は再登録を妨げない
            let duplicate: Option<(RegistrationId,)> = sqlx::query_as(
                r#"
                    SELECT registration_id
                    FROM registrations
                    WHERE event_id = $1 AND user_id = $2 AND status = 'confirmed'
                    LIMIT 1
                "#,
            )
            .bind(event.event_id)
            .bind(event.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if duplicate.is_some() {
                return Err(AppError::DuplicateRegistration);
            }
        }

        let registration_id = RegistrationId::new();
        let issued_at = Utc::now();
        let qr_code = generate_qr_code(issued_at);

        let res = sqlx::query(
            r#"
                INSERT INTO registrations
                (registration_id, event_id, user_id, qr_code,
                status, checked_in, created_at, updated_at)
                VALUES ($1, $2, $3, $4, 'confirmed', FALSE, $5, $5)
            "#,
        )
        .bind(registration_id)
        .bind(event.event_id)
        .bind(event.user_id)
        .bind(&qr_code)
        .bind(issued_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No registration record has been created".into(),
            ));
        }

        // イベント側の登録数カウンターを進める
        sqlx::query(
            r#"
                UPDATE events
                SET registration_count = registration_count + 1, updated_at = $2
                WHERE event_id = $1
            "#,
        )
        .bind(event.event_id)
        .bind(issued_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(registration_id)
    }

    // 登録のキャンセル操作を行う。
    // キャンセルしても registration_count は戻さない（定員は解放されない）
    async fn cancel(&self, event: CancelRegistration) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        {
            let row: Option<(UserId, String)> = sqlx::query_as(
                r#"
                    SELECT user_id, status
                    FROM registrations
                    WHERE registration_id = $1
                "#,
            )
            .bind(event.registration_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let (user_id, status) = row.ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "登録（{}）が見つかりませんでした。",
                    event.registration_id
                ))
            })?;

            // 本人のチケットしかキャンセルできない
            if user_id != event.requested_user {
                return Err(AppError::ForbiddenOperation);
            }

            if parse_status(&status)? == RegistrationStatus::Cancelled {
                return Err(AppError::UnprocessableEntity(
                    "この登録はすでにキャンセルされています。".into(),
                ));
            }
        }

        let res = sqlx::query(
            r#"
                UPDATE registrations
                SET status = 'cancelled', updated_at = NOW()
                WHERE registration_id = $1
            "#,
        )
        .bind(event.registration_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No registration record has been cancelled".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    // チェックイン操作を行う。
    // 対象行を FOR UPDATE でロックしてから判定・更新するため、
    // 同一チケットの同時スキャンは直列化され、成功するのは必ず一回だけになる。
    // 弾かれた場合もエラーではなく結果として返す
    async fn check_in(&self, qr_code: &str) -> AppResult<CheckInOutcome> {
        let mut tx = self.db.begin().await?;

        let row: Option<RegistrationStateRow> = sqlx::query_as(
            r#"
                SELECT status, checked_in
                FROM registrations
                WHERE qr_code = $1
                FOR UPDATE
            "#,
        )
        .bind(qr_code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Ok(CheckInOutcome::rejected(CheckInRejection::InvalidTicket));
        };

        let state = RegistrationState::try_from(row)?;
        if let Err(rejection) = evaluate_check_in(state.status, state.checked_in) {
            return Ok(CheckInOutcome::rejected(rejection));
        }

        let res = sqlx::query(
            r#"
                UPDATE registrations
                SET checked_in = TRUE, checked_in_at = $2, updated_at = $2
                WHERE qr_code = $1
            "#,
        )
        .bind(qr_code)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No registration record has been checked in".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(CheckInOutcome::succeeded())
    }

    // ユーザーが保持するチケット一覧を取得する
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Registration>> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            r#"
                SELECT
                r.registration_id,
                r.event_id,
                r.user_id,
                u.name AS user_name,
                u.email,
                r.qr_code,
                r.status,
                r.checked_in,
                r.checked_in_at,
                r.created_at,
                e.title,
                e.slug,
                e.start_at,
                e.end_at,
                e.city,
                e.cover_image_url
                FROM registrations AS r
                INNER JOIN events AS e ON r.event_id = e.event_id
                INNER JOIN users AS u ON r.user_id = u.user_id
                WHERE r.user_id = $1
                ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Registration::try_from).collect()
    }

    // ダッシュボード集計用にイベントの登録状態のみを取得する
    async fn find_states_by_event_id(
        &self,
        event_id: EventId,
    ) -> AppResult<Vec<RegistrationState>> {
        let rows: Vec<RegistrationStateRow> = sqlx::query_as(
            r#"
                SELECT status, checked_in
                FROM registrations
                WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(RegistrationState::try_from).collect()
    }
}

impl RegistrationRepositoryImpl {
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
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kernel::model::{
        auth::Identity,
        event::{event::CreateEvent, EventLocation, TicketKind},
    };
    use kernel::repository::{event::EventRepository, user::UserRepository};

    use super::*;
    use crate::repository::{event::EventRepositoryImpl, user::UserRepositoryImpl};

    async fn fixture_user(pool: &sqlx::PgPool, subject: &str) -> anyhow::Result<UserId> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user = repo
            .resolve_or_create(Identity {
                subject: subject.into(),
                name: Some(subject.into()),
                email: Some(format!("{subject}@example.com")),
                picture_url: None,
            })
            .await?;
        Ok(user.user_id)
    }

    async fn fixture_event(
        pool: &sqlx::PgPool,
        organizer_id: UserId,
        capacity: i32,
    ) -> anyhow::Result<EventId> {
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool.clone()), 1);
        let start_at = Utc::now() + chrono::Duration::days(1);
        let event_id = repo
            .create(CreateEvent::new(
                organizer_id,
                "Door Test".into(),
                "".into(),
                "technology".into(),
                vec![],
                start_at,
                start_at + chrono::Duration::hours(2),
                "Asia/Tokyo".into(),
                EventLocation::Online {
                    link: "https://example.com/live".into(),
                },
                "Tokyo".into(),
                None,
                "Japan".into(),
                capacity,
                TicketKind::Paid { price: 1000 },
                None,
                None,
            ))
            .await?;
        Ok(event_id)
    }

    async fn qr_code_of(
        pool: &sqlx::PgPool,
        registration_id: RegistrationId,
    ) -> anyhow::Result<String> {
        let (qr_code,): (String,) =
            sqlx::query_as("SELECT qr_code FROM registrations WHERE registration_id = $1")
                .bind(registration_id)
                .fetch_one(pool)
                .await?;
        Ok(qr_code)
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn second_check_in_of_the_same_ticket_is_rejected(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "organizer").await?;
        let attendee_id = fixture_user(&pool, "attendee").await?;
        let event_id = fixture_event(&pool, organizer_id, 10).await?;
        let repo = RegistrationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let registration_id = repo
            .create(CreateRegistration::new(event_id, attendee_id))
            .await?;
        let qr_code = qr_code_of(&pool, registration_id).await?;

        let first = repo.check_in(&qr_code).await?;
        assert!(first.success);
        assert_eq!(first.message, "Check-in successful");

        let second = repo.check_in(&qr_code).await?;
        assert!(!second.success);
        assert_eq!(second.message, "Already checked in");

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn unknown_codes_and_cancelled_tickets_are_rejected(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "organizer").await?;
        let attendee_id = fixture_user(&pool, "attendee").await?;
        let event_id = fixture_event(&pool, organizer_id, 10).await?;
        let repo = RegistrationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let unknown = repo.check_in("EVT-0-XXXXXX").await?;
        assert!(!unknown.success);
        assert_eq!(unknown.message, "Invalid QR code");

        let registration_id = repo
            .create(CreateRegistration::new(event_id, attendee_id))
            .await?;
        repo.cancel(CancelRegistration::new(registration_id, attendee_id))
            .await?;

        let qr_code = qr_code_of(&pool, registration_id).await?;
        let cancelled = repo.check_in(&qr_code).await?;
        assert!(!cancelled.success);
        assert_eq!(cancelled.message, "Ticket cancelled");

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn concurrent_scans_of_one_ticket_succeed_exactly_once(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "organizer").await?;
        let attendee_id = fixture_user(&pool, "attendee").await?;
        let event_id = fixture_event(&pool, organizer_id, 10).await?;
        let repo = Arc::new(RegistrationRepositoryImpl::new(ConnectionPool::new(
            pool.clone(),
        )));

        let registration_id = repo
            .create(CreateRegistration::new(event_id, attendee_id))
            .await?;
        let qr_code = qr_code_of(&pool, registration_id).await?;

        // 2 台のスキャナーが同時に同じチケットを読む状況を再現する
        let a = {
            let repo = Arc::clone(&repo);
            let qr_code = qr_code.clone();
            tokio::spawn(async move { repo.check_in(&qr_code).await })
        };
        let b = {
            let repo = Arc::clone(&repo);
            let qr_code = qr_code.clone();
            tokio::spawn(async move { repo.check_in(&qr_code).await })
        };

        let outcomes = [a.await??, b.await??];
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let already = outcomes
            .iter()
            .filter(|o| o.message == "Already checked in")
            .count();
        assert_eq!(succeeded, 1);
        assert_eq!(already, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn capacity_is_not_freed_by_cancellation(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "organizer").await?;
        let first = fixture_user(&pool, "first").await?;
        let second = fixture_user(&pool, "second").await?;
        let third = fixture_user(&pool, "third").await?;
        let event_id = fixture_event(&pool, organizer_id, 2).await?;
        let repo = RegistrationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let kept = repo.create(CreateRegistration::new(event_id, first)).await?;
        repo.create(CreateRegistration::new(event_id, second))
            .await?;

        // 定員 2 なので 3 人目は登録できない
        let err = repo
            .create(CreateRegistration::new(event_id, third))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));

        // キャンセルしても定員は解放されない
        repo.cancel(CancelRegistration::new(kept, first)).await?;
        let err = repo
            .create(CreateRegistration::new(event_id, third))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn an_attendee_cannot_hold_two_live_registrations(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let organizer_id = fixture_user(&pool, "organizer").await?;
        let attendee_id = fixture_user(&pool, "attendee").await?;
        let event_id = fixture_event(&pool, organizer_id, 10).await?;
        let repo = RegistrationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        repo.create(CreateRegistration::new(event_id, attendee_id))
            .await?;

        let err = repo
            .create(CreateRegistration::new(event_id, attendee_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateRegistration));

        Ok(())
    }
}

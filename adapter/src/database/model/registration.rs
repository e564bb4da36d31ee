use std::str::FromStr;

use kernel::model::{
    id::{EventId, RegistrationId, UserId},
    registration::{Registration, RegistrationEvent, RegistrationState, RegistrationStatus},
    user::RegistrationAttendee,
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};

// チケット一覧を取得する際に使う型。
// events・users と JOIN してイベント概要と参加者情報も一緒に抽出する
#[derive(sqlx::FromRow)]
pub struct RegistrationRow {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub qr_code: String,
    pub status: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub slug: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub city: String,
    pub cover_image_url: Option<String>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = AppError;

    fn try_from(value: RegistrationRow) -> Result<Self, Self::Error> {
        let RegistrationRow {
            registration_id,
            event_id,
            user_id,
            user_name,
            email,
            qr_code,
            status,
            checked_in,
            checked_in_at,
            created_at,
            title,
            slug,
            start_at,
            end_at,
            city,
            cover_image_url,
        } = value;

        Ok(Registration {
            registration_id,
            attendee: RegistrationAttendee {
                user_id,
                user_name,
                email,
            },
            qr_code,
            status: parse_status(&status)?,
            checked_in,
            checked_in_at,
            created_at,
            event: RegistrationEvent {
                event_id,
                title,
                slug,
                start_at,
                end_at,
                city,
                cover_image_url,
            },
        })
    }
}

// チェックイン判定とダッシュボード集計で使う最小限の型
#[derive(sqlx::FromRow)]
pub struct RegistrationStateRow {
    pub status: String,
    pub checked_in: bool,
}

impl TryFrom<RegistrationStateRow> for RegistrationState {
    type Error = AppError;

    fn try_from(value: RegistrationStateRow) -> Result<Self, Self::Error> {
        Ok(RegistrationState {
            status: parse_status(&value.status)?,
            checked_in: value.checked_in,
        })
    }
}

pub fn parse_status(status: &str) -> Result<RegistrationStatus, AppError> {
    RegistrationStatus::from_str(status).map_err(|_| {
        AppError::ConversionEntityError(format!("未知の登録ステータスです: {status}"))
    })
}

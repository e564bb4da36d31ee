use chrono::{serde::ts_milliseconds, serde::ts_milliseconds_option, DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{EventId, RegistrationId, UserId},
    registration::{CheckInOutcome, Registration, RegistrationEvent, RegistrationStatus},
};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

#[derive(Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegistrationStatusName {
    Confirmed,
    Cancelled,
}

impl From<RegistrationStatus> for RegistrationStatusName {
    fn from(value: RegistrationStatus) -> Self {
        match value {
            RegistrationStatus::Confirmed => Self::Confirmed,
            RegistrationStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationsResponse {
    pub items: Vec<RegistrationResponse>,
}

impl From<Vec<Registration>> for RegistrationsResponse {
    fn from(value: Vec<Registration>) -> Self {
        Self {
            items: value.into_iter().map(RegistrationResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub registration_id: RegistrationId,
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub qr_code: String,
    pub status: RegistrationStatusName,
    pub checked_in: bool,
    #[serde(with = "ts_milliseconds_option")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub event: RegistrationEventResponse,
}

impl From<Registration> for RegistrationResponse {
    fn from(value: Registration) -> Self {
        let Registration {
            registration_id,
            attendee,
            qr_code,
            status,
            checked_in,
            checked_in_at,
            created_at,
            event,
        } = value;
        Self {
            registration_id,
            user_id: attendee.user_id,
            user_name: attendee.user_name,
            email: attendee.email,
            qr_code,
            status: status.into(),
            checked_in,
            checked_in_at,
            created_at,
            event: event.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEventResponse {
    pub event_id: EventId,
    pub title: String,
    pub slug: String,
    #[serde(with = "ts_milliseconds")]
    pub start_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub end_at: DateTime<Utc>,
    pub city: String,
    pub cover_image_url: Option<String>,
}

impl From<RegistrationEvent> for RegistrationEventResponse {
    fn from(value: RegistrationEvent) -> Self {
        let RegistrationEvent {
            event_id,
            title,
            slug,
            start_at,
            end_at,
            city,
            cover_image_url,
        } = value;
        Self {
            event_id,
            title,
            slug,
            start_at,
            end_at,
            city,
            cover_image_url,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationResponse {
    pub registration_id: RegistrationId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[garde(length(min = 1))]
    pub qr_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub success: bool,
    pub message: String,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(value: CheckInOutcome) -> Self {
        let CheckInOutcome { success, message } = value;
        Self { success, message }
    }
}

use kernel::model::{
    event::{Event, EventLocation, TicketKind},
    id::{EventId, UserId},
    user::EventOrganizer,
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};

pub const LOCATION_TYPE_PHYSICAL: &str = "physical";
pub const LOCATION_TYPE_ONLINE: &str = "online";
pub const TICKET_TYPE_FREE: &str = "free";
pub const TICKET_TYPE_PAID: &str = "paid";

// イベント一覧・詳細で使う型。users と JOIN して主催者名も一緒に抽出する
#[derive(sqlx::FromRow)]
pub struct EventRow {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub timezone: String,
    pub location_type: String,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub online_link: Option<String>,
    pub capacity: i32,
    pub ticket_type: String,
    pub ticket_price: Option<i64>,
    pub cover_image_url: Option<String>,
    pub theme_color: Option<String>,
    pub slug: String,
    pub organizer_id: UserId,
    pub organizer_name: String,
    pub registration_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(value: EventRow) -> Result<Self, Self::Error> {
        let EventRow {
            event_id,
            title,
            description,
            category,
            tags,
            start_at,
            end_at,
            timezone,
            location_type,
            venue,
            address,
            city,
            state,
            country,
            online_link,
            capacity,
            ticket_type,
            ticket_price,
            cover_image_url,
            theme_color,
            slug,
            organizer_id,
            organizer_name,
            registration_count,
            created_at,
            updated_at,
        } = value;

        let location = match location_type.as_str() {
            LOCATION_TYPE_PHYSICAL => EventLocation::Physical { venue, address },
            LOCATION_TYPE_ONLINE => EventLocation::Online {
                link: online_link.ok_or_else(|| {
                    AppError::ConversionEntityError(format!(
                        "オンラインイベント（{event_id}）に配信リンクがありません。"
                    ))
                })?,
            },
            other => {
                return Err(AppError::ConversionEntityError(format!(
                    "未知の開催形式です: {other}"
                )))
            }
        };

        let ticket = match ticket_type.as_str() {
            TICKET_TYPE_FREE => TicketKind::Free,
            TICKET_TYPE_PAID => TicketKind::Paid {
                price: ticket_price.ok_or_else(|| {
                    AppError::ConversionEntityError(format!(
                        "有料イベント（{event_id}）に価格がありません。"
                    ))
                })?,
            },
            other => {
                return Err(AppError::ConversionEntityError(format!(
                    "未知のチケット種別です: {other}"
                )))
            }
        };

        Ok(Event {
            event_id,
            title,
            description,
            category,
            tags,
            start_at,
            end_at,
            timezone,
            location,
            city,
            state,
            country,
            capacity,
            ticket,
            cover_image_url,
            theme_color,
            slug,
            organizer: EventOrganizer {
                organizer_id,
                organizer_name,
            },
            registration_count,
            created_at,
            updated_at,
        })
    }
}

// INSERT 用に開催形式のカラム値へ分解する
pub fn location_columns(
    location: &EventLocation,
) -> (&'static str, Option<&String>, Option<&String>, Option<&String>) {
    match location {
        EventLocation::Physical { venue, address } => (
            LOCATION_TYPE_PHYSICAL,
            venue.as_ref(),
            address.as_ref(),
            None,
        ),
        EventLocation::Online { link } => (LOCATION_TYPE_ONLINE, None, None, Some(link)),
    }
}

// INSERT 用にチケット種別のカラム値へ分解する
pub fn ticket_columns(ticket: &TicketKind) -> (&'static str, Option<i64>) {
    match ticket {
        TicketKind::Free => (TICKET_TYPE_FREE, None),
        TicketKind::Paid { price } => (TICKET_TYPE_PAID, Some(*price)),
    }
}

use chrono::{serde::ts_milliseconds, serde::ts_milliseconds_option, DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    event::{
        event::{CreateEvent, EventListFilter, UpdateEvent},
        Event, EventLocation, TicketKind,
    },
    id::{EventId, UserId},
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use strum::VariantNames;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocationTypeName {
    Physical,
    Online,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TicketTypeName {
    Free,
    Paid,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(skip)]
    pub description: String,
    #[garde(length(min = 1))]
    pub category: String,
    #[garde(skip)]
    #[serde(default)]
    pub tags: Vec<String>,
    #[garde(skip)]
    #[serde(with = "ts_milliseconds")]
    pub start_at: DateTime<Utc>,
    #[garde(skip)]
    #[serde(with = "ts_milliseconds")]
    pub end_at: DateTime<Utc>,
    #[garde(length(min = 1))]
    pub timezone: String,
    #[garde(skip)]
    pub location_type: LocationTypeName,
    #[garde(skip)]
    pub venue: Option<String>,
    #[garde(skip)]
    pub address: Option<String>,
    #[garde(length(min = 1))]
    pub city: String,
    #[garde(skip)]
    pub state: Option<String>,
    #[garde(length(min = 1))]
    pub country: String,
    #[garde(skip)]
    pub online_link: Option<String>,
    #[garde(range(min = 1))]
    pub capacity: i32,
    #[garde(skip)]
    pub ticket_type: TicketTypeName,
    #[garde(skip)]
    pub ticket_price: Option<i64>,
    #[garde(skip)]
    pub cover_image_url: Option<String>,
    #[garde(skip)]
    pub theme_color: Option<String>,
}

#[derive(new)]
pub struct CreateEventRequestWithOrganizerId(UserId, CreateEventRequest);

// 項目単体のチェックは garde、項目をまたぐ整合性はこの変換で確認する
impl TryFrom<CreateEventRequestWithOrganizerId> for CreateEvent {
    type Error = AppError;

    fn try_from(value: CreateEventRequestWithOrganizerId) -> Result<Self, Self::Error> {
        let CreateEventRequestWithOrganizerId(organizer_id, req) = value;

        if req.end_at <= req.start_at {
            return Err(AppError::UnprocessableEntity(
                "終了日時は開始日時より後である必要があります。".into(),
            ));
        }

        let location = match req.location_type {
            LocationTypeName::Physical => EventLocation::Physical {
                venue: req.venue,
                address: req.address,
            },
            LocationTypeName::Online => EventLocation::Online {
                link: req.online_link.ok_or_else(|| {
                    AppError::UnprocessableEntity(
                        "オンラインイベントには配信リンクが必要です。".into(),
                    )
                })?,
            },
        };

        let ticket = match req.ticket_type {
            TicketTypeName::Free => TicketKind::Free,
            TicketTypeName::Paid => {
                let price = req.ticket_price.ok_or_else(|| {
                    AppError::UnprocessableEntity("有料イベントには価格が必要です。".into())
                })?;
                if price < 1 {
                    return Err(AppError::UnprocessableEntity(
                        "価格は 1 以上である必要があります。".into(),
                    ));
                }
                TicketKind::Paid { price }
            }
        };

        Ok(CreateEvent {
            organizer_id,
            title: req.title,
            description: req.description,
            category: req.category,
            tags: req.tags,
            start_at: req.start_at,
            end_at: req.end_at,
            timezone: req.timezone,
            location,
            city: req.city,
            state: req.state,
            country: req.country,
            capacity: req.capacity,
            ticket,
            cover_image_url: req.cover_image_url,
            theme_color: req.theme_color,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub event_id: EventId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    #[garde(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[garde(skip)]
    pub category: Option<String>,
    #[garde(skip)]
    pub city: Option<String>,
}

impl From<EventListQuery> for EventListFilter {
    fn from(value: EventListQuery) -> Self {
        let EventListQuery {
            limit,
            category,
            city,
        } = value;
        EventListFilter {
            limit,
            category,
            city,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[garde(inner(length(min = 1)))]
    pub title: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub category: Option<String>,
    #[garde(skip)]
    #[serde(default, with = "ts_milliseconds_option")]
    pub start_at: Option<DateTime<Utc>>,
    #[garde(skip)]
    #[serde(default, with = "ts_milliseconds_option")]
    pub end_at: Option<DateTime<Utc>>,
    #[garde(inner(range(min = 1)))]
    pub capacity: Option<i32>,
    #[garde(skip)]
    pub cover_image_url: Option<String>,
    #[garde(skip)]
    pub theme_color: Option<String>,
}

#[derive(new)]
pub struct UpdateEventRequestWithIds(EventId, UserId, UpdateEventRequest);

impl TryFrom<UpdateEventRequestWithIds> for UpdateEvent {
    type Error = AppError;

    fn try_from(value: UpdateEventRequestWithIds) -> Result<Self, Self::Error> {
        let UpdateEventRequestWithIds(event_id, requested_user, req) = value;

        // 両方の日時が指定されたときだけ前後関係を確認できる
        if let (Some(start_at), Some(end_at)) = (req.start_at, req.end_at) {
            if end_at <= start_at {
                return Err(AppError::UnprocessableEntity(
                    "終了日時は開始日時より後である必要があります。".into(),
                ));
            }
        }

        Ok(UpdateEvent {
            event_id,
            requested_user,
            title: req.title,
            description: req.description,
            category: req.category,
            start_at: req.start_at,
            end_at: req.end_at,
            capacity: req.capacity,
            cover_image_url: req.cover_image_url,
            theme_color: req.theme_color,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub items: Vec<EventResponse>,
}

impl From<Vec<Event>> for EventsResponse {
    fn from(value: Vec<Event>) -> Self {
        Self {
            items: value.into_iter().map(EventResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(with = "ts_milliseconds")]
    pub start_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub end_at: DateTime<Utc>,
    pub timezone: String,
    pub location_type: LocationTypeName,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub online_link: Option<String>,
    pub capacity: i32,
    pub ticket_type: TicketTypeName,
    pub ticket_price: Option<i64>,
    pub cover_image_url: Option<String>,
    pub theme_color: Option<String>,
    pub slug: String,
    pub organizer_id: UserId,
    pub organizer_name: String,
    pub registration_count: i32,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(value: Event) -> Self {
        let Event {
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
            organizer,
            registration_count,
            created_at,
            updated_at,
        } = value;

        let (location_type, venue, address, online_link) = match location {
            EventLocation::Physical { venue, address } => {
                (LocationTypeName::Physical, venue, address, None)
            }
            EventLocation::Online { link } => (LocationTypeName::Online, None, None, Some(link)),
        };
        let (ticket_type, ticket_price) = match ticket {
            TicketKind::Free => (TicketTypeName::Free, None),
            TicketKind::Paid { price } => (TicketTypeName::Paid, Some(price)),
        };

        Self {
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
            organizer_id: organizer.organizer_id,
            organizer_name: organizer.organizer_name,
            registration_count,
            created_at,
            updated_at,
        }
    }
}

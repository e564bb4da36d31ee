use chrono::{DateTime, Utc};
use derive_new::new;

use crate::model::{
    event::{EventLocation, TicketKind},
    id::{EventId, UserId},
};

#[derive(new, Debug)]
pub struct CreateEvent {
    pub organizer_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub timezone: String,
    pub location: EventLocation,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub capacity: i32,
    pub ticket: TicketKind,
    pub cover_image_url: Option<String>,
    pub theme_color: Option<String>,
}

#[derive(Debug)]
pub struct UpdateEvent {
    pub event_id: EventId,
    pub requested_user: UserId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub cover_image_url: Option<String>,
    pub theme_color: Option<String>,
}

#[derive(Debug)]
pub struct DeleteEvent {
    pub event_id: EventId,
    pub requested_user: UserId,
}

#[derive(new, Debug, Default)]
pub struct EventListFilter {
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub city: Option<String>,
}

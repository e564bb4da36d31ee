use kernel::model::dashboard::EventStats;
use serde::Serialize;

use crate::model::event::EventResponse;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDashboardResponse {
    pub event: EventResponse,
    pub stats: EventStatsResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStatsResponse {
    pub total_registrations: i64,
    pub checked_in_count: i64,
    pub pending_count: i64,
    pub capacity: i32,
    pub check_in_rate: i64,
    pub total_revenue: i64,
    pub hours_until_event: i64,
    pub is_event_today: bool,
    pub is_event_past: bool,
}

impl From<EventStats> for EventStatsResponse {
    fn from(value: EventStats) -> Self {
        let EventStats {
            total_registrations,
            checked_in_count,
            pending_count,
            capacity,
            check_in_rate,
            total_revenue,
            hours_until_event,
            is_event_today,
            is_event_past,
        } = value;
        Self {
            total_registrations,
            checked_in_count,
            pending_count,
            capacity,
            check_in_rate,
            total_revenue,
            hours_until_event,
            is_event_today,
            is_event_past,
        }
    }
}

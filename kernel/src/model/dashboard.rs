use chrono::{DateTime, Utc};

use crate::model::{
    event::{Event, TicketKind},
    registration::{RegistrationState, RegistrationStatus},
};

#[derive(Debug, PartialEq, Eq)]
pub struct EventStats {
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

impl EventStats {
    // イベントの登録一覧から統計を毎回計算し直す。キャッシュは持たない。
    pub fn calculate(
        event: &Event,
        registrations: &[RegistrationState],
        now: DateTime<Utc>,
    ) -> Self {
        let total_registrations = registrations
            .iter()
            .filter(|r| r.status == RegistrationStatus::Confirmed)
            .count() as i64;
        let checked_in_count = registrations
            .iter()
            .filter(|r| r.status == RegistrationStatus::Confirmed && r.checked_in)
            .count() as i64;
        let pending_count = total_registrations - checked_in_count;

        let check_in_rate = if total_registrations > 0 {
            ((checked_in_count as f64 / total_registrations as f64) * 100.0).round() as i64
        } else {
            0
        };

        // 売上はチェックイン済みの人数ベースで算出する（有料イベントのみ）
        let total_revenue = match event.ticket {
            TicketKind::Paid { price } => checked_in_count * price,
            TicketKind::Free => 0,
        };

        let hours_until_event = (event.start_at - now).num_hours().max(0);

        let today = now.date_naive();
        let is_event_today =
            today >= event.start_at.date_naive() && today <= event.end_at.date_naive();
        let is_event_past = event.end_at < now;

        Self {
            total_registrations,
            checked_in_count,
            pending_count,
            capacity: event.capacity,
            check_in_rate,
            total_revenue,
            hours_until_event,
            is_event_today,
            is_event_past,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::model::{
        event::EventLocation,
        id::{EventId, UserId},
        user::EventOrganizer,
    };

    fn event(ticket: TicketKind, start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Event {
        Event {
            event_id: EventId::new(),
            title: "Rust Meetup".into(),
            description: "".into(),
            category: "technology".into(),
            tags: vec![],
            start_at,
            end_at,
            timezone: "Asia/Tokyo".into(),
            location: EventLocation::Online {
                link: "https://example.com/live".into(),
            },
            city: "Tokyo".into(),
            state: None,
            country: "Japan".into(),
            capacity: 100,
            ticket,
            cover_image_url: None,
            theme_color: None,
            slug: "rust-meetup-0".into(),
            organizer: EventOrganizer {
                organizer_id: UserId::new(),
                organizer_name: "Organizer".into(),
            },
            registration_count: 0,
            created_at: start_at,
            updated_at: start_at,
        }
    }

    fn state(status: RegistrationStatus, checked_in: bool) -> RegistrationState {
        RegistrationState { status, checked_in }
    }

    #[test]
    fn rate_is_zero_when_there_are_no_registrations() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(TicketKind::Free, now + Duration::hours(3), now + Duration::hours(5));

        let stats = EventStats::calculate(&ev, &[], now);

        assert_eq!(stats.total_registrations, 0);
        assert_eq!(stats.check_in_rate, 0);
        assert_eq!(stats.total_revenue, 0);
    }

    #[test]
    fn cancelled_registrations_are_excluded_from_every_count() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(TicketKind::Free, now + Duration::hours(3), now + Duration::hours(5));
        let regs = [
            state(RegistrationStatus::Confirmed, true),
            state(RegistrationStatus::Confirmed, false),
            state(RegistrationStatus::Cancelled, false),
            state(RegistrationStatus::Cancelled, true),
        ];

        let stats = EventStats::calculate(&ev, &regs, now);

        assert_eq!(stats.total_registrations, 2);
        assert_eq!(stats.checked_in_count, 1);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.check_in_rate, 50);
    }

    #[test]
    fn rate_is_rounded_to_the_nearest_integer() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(TicketKind::Free, now + Duration::hours(3), now + Duration::hours(5));
        let regs = [
            state(RegistrationStatus::Confirmed, true),
            state(RegistrationStatus::Confirmed, false),
            state(RegistrationStatus::Confirmed, false),
        ];

        let stats = EventStats::calculate(&ev, &regs, now);

        // 1/3 = 33.33...% → 33
        assert_eq!(stats.check_in_rate, 33);
    }

    #[test]
    fn revenue_counts_only_checked_in_attendees_of_paid_events() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(
            TicketKind::Paid { price: 2500 },
            now + Duration::hours(3),
            now + Duration::hours(5),
        );
        let regs = [
            state(RegistrationStatus::Confirmed, true),
            state(RegistrationStatus::Confirmed, true),
            state(RegistrationStatus::Confirmed, false),
        ];

        let stats = EventStats::calculate(&ev, &regs, now);

        assert_eq!(stats.total_revenue, 5000);
    }

    #[test]
    fn hours_until_event_never_goes_negative() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(
            TicketKind::Free,
            now - Duration::hours(30),
            now - Duration::hours(26),
        );

        let stats = EventStats::calculate(&ev, &[], now);

        assert_eq!(stats.hours_until_event, 0);
        assert!(stats.is_event_past);
        assert!(!stats.is_event_today);
    }

    #[test]
    fn event_spanning_today_is_flagged_as_today() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(
            TicketKind::Free,
            now - Duration::hours(1),
            now + Duration::hours(1),
        );

        let stats = EventStats::calculate(&ev, &[], now);

        assert!(stats.is_event_today);
        assert!(!stats.is_event_past);
        assert_eq!(stats.hours_until_event, 0);
    }

    #[test]
    fn upcoming_event_reports_whole_hours_remaining() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let ev = event(
            TicketKind::Free,
            now + Duration::minutes(150),
            now + Duration::minutes(270),
        );

        let stats = EventStats::calculate(&ev, &[], now);

        // 2 時間 30 分後 → 2 時間
        assert_eq!(stats.hours_until_event, 2);
    }
}

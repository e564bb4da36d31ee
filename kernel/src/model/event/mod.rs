use chrono::{DateTime, Utc};

use crate::model::{id::EventId, user::EventOrganizer};

pub mod event;

#[derive(Debug)]
pub struct Event {
    pub event_id: EventId,
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
    pub slug: String,
    pub organizer: EventOrganizer,
    pub registration_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventLocation {
    Physical {
        venue: Option<String>,
        address: Option<String>,
    },
    Online {
        link: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    Free,
    // price は通貨の最小単位で保持する
    Paid { price: i64 },
}

impl TicketKind {
    pub fn is_free(&self) -> bool {
        matches!(self, TicketKind::Free)
    }

    pub fn price(&self) -> Option<i64> {
        match self {
            TicketKind::Free => None,
            TicketKind::Paid { price } => Some(*price),
        }
    }
}

// タイトルからスラッグを生成する。
// 英数字以外の連続は 1 つのハイフンにまとめ、先頭・末尾のハイフンは落とす。
// 同名タイトルでも一意になるよう、作成時刻（エポックミリ秒）を末尾に付ける。
pub fn generate_slug(title: &str, created_at: DateTime<Utc>) -> String {
    let mut prefix = String::with_capacity(title.len());
    let mut prev_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            prefix.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            prefix.push('-');
            prev_hyphen = true;
        }
    }
    let prefix = prefix.trim_end_matches('-');
    format!("{}-{}", prefix, created_at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn slug_collapses_symbol_runs_into_single_hyphens() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            generate_slug("My Cool Event!!", created_at),
            "my-cool-event-1700000000000"
        );
    }

    #[test]
    fn slug_keeps_digits_and_lowercases() {
        let created_at = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(generate_slug("Rust 2024 Meetup", created_at), "rust-2024-meetup-42");
    }

    #[test]
    fn slug_trims_leading_and_trailing_hyphens() {
        let created_at = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(generate_slug("--Hello, World--", created_at), "hello-world-42");
    }

    #[test]
    fn slug_of_symbol_only_title_is_just_the_disambiguator() {
        let created_at = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(generate_slug("!!!", created_at), "-42");
    }

    #[test]
    fn same_title_with_different_creation_times_yields_distinct_slugs() {
        let a = generate_slug("Duplicate", Utc.timestamp_millis_opt(1).unwrap());
        let b = generate_slug("Duplicate", Utc.timestamp_millis_opt(2).unwrap());
        assert_ne!(a, b);
        assert!(a.starts_with("duplicate-"));
        assert!(b.starts_with("duplicate-"));
    }
}

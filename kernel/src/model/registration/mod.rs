use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use strum::{AsRefStr, EnumString};

use crate::model::{
    id::{EventId, RegistrationId},
    user::RegistrationAttendee,
};

pub mod event;

#[derive(Debug)]
pub struct Registration {
    pub registration_id: RegistrationId,
    pub attendee: RegistrationAttendee,
    pub qr_code: String,
    pub status: RegistrationStatus,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub event: RegistrationEvent,
}

// チケット一覧で表示するためのイベント側の要約
#[derive(Debug)]
pub struct RegistrationEvent {
    pub event_id: EventId,
    pub title: String,
    pub slug: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub city: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

// ダッシュボード集計で使う最小限のビュー
#[derive(Debug, Clone, Copy)]
pub struct RegistrationState {
    pub status: RegistrationStatus,
    pub checked_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInRejection {
    InvalidTicket,
    TicketCancelled,
    AlreadyCheckedIn,
}

// チェックインの結果。スキャンしたコードが弾かれるのは日常的に起こることなので、
// エラーではなく結果として呼び出し側へ返す。
#[derive(Debug, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub success: bool,
    pub message: String,
}

impl CheckInOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: "Check-in successful".into(),
        }
    }

    pub fn rejected(rejection: CheckInRejection) -> Self {
        let message = match rejection {
            CheckInRejection::InvalidTicket => "Invalid QR code",
            CheckInRejection::TicketCancelled => "Ticket cancelled",
            CheckInRejection::AlreadyCheckedIn => "Already checked in",
        };
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// checked_in は false→true の一方向のみ。ここで許可された場合のみ遷移させる。
pub fn evaluate_check_in(
    status: RegistrationStatus,
    checked_in: bool,
) -> Result<(), CheckInRejection> {
    match (status, checked_in) {
        (RegistrationStatus::Cancelled, _) => Err(CheckInRejection::TicketCancelled),
        (RegistrationStatus::Confirmed, true) => Err(CheckInRejection::AlreadyCheckedIn),
        (RegistrationStatus::Confirmed, false) => Ok(()),
    }
}

// QR コードに載せるチケットコード。手入力もできる形式にしている。
// 例: EVT-1712345678901-A3F9XK
pub fn generate_qr_code(issued_at: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!(
        "EVT-{}-{}",
        issued_at.timestamp_millis(),
        suffix.to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use std::str::FromStr;

    use super::*;

    #[test]
    fn check_in_is_allowed_only_once_for_confirmed_tickets() {
        assert_eq!(
            evaluate_check_in(RegistrationStatus::Confirmed, false),
            Ok(())
        );
        assert_eq!(
            evaluate_check_in(RegistrationStatus::Confirmed, true),
            Err(CheckInRejection::AlreadyCheckedIn)
        );
    }

    #[test]
    fn cancelled_tickets_are_rejected_regardless_of_check_in_state() {
        assert_eq!(
            evaluate_check_in(RegistrationStatus::Cancelled, false),
            Err(CheckInRejection::TicketCancelled)
        );
        assert_eq!(
            evaluate_check_in(RegistrationStatus::Cancelled, true),
            Err(CheckInRejection::TicketCancelled)
        );
    }

    #[test]
    fn qr_code_is_human_typeable() {
        let issued_at = chrono::Utc.timestamp_millis_opt(1_712_345_678_901).unwrap();
        let code = generate_qr_code(issued_at);

        let mut parts = code.splitn(3, '-');
        assert_eq!(parts.next(), Some("EVT"));
        assert_eq!(parts.next(), Some("1712345678901"));
        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn status_round_trips_through_its_text_representation() {
        assert_eq!(RegistrationStatus::Confirmed.as_ref(), "confirmed");
        assert_eq!(
            RegistrationStatus::from_str("cancelled").unwrap(),
            RegistrationStatus::Cancelled
        );
    }
}

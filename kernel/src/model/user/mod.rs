use crate::model::id::UserId;

pub mod event;

#[derive(Debug, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub subject_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub has_completed_onboarding: bool,
    pub free_events_created: i32,
    pub location: Option<UserLocation>,
    pub interests: Option<Vec<String>>,
    pub organizer_profile: Option<OrganizerProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserLocation {
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizerProfile {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: SocialLinks,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

// イベント一覧などで主催者を表示するための型
#[derive(Debug)]
pub struct EventOrganizer {
    pub organizer_id: UserId,
    pub organizer_name: String,
}

#[derive(Debug)]
pub struct RegistrationAttendee {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
}

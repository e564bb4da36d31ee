use kernel::model::{
    id::UserId,
    user::{OrganizerProfile, SocialLinks, User, UserLocation},
};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub subject_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub has_completed_onboarding: bool,
    pub free_events_created: i32,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub interests: Option<Vec<String>>,
    pub organizer_bio: Option<String>,
    pub organizer_website: Option<String>,
    pub organizer_twitter: Option<String>,
    pub organizer_instagram: Option<String>,
    pub organizer_linkedin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            subject_id,
            name,
            email,
            image_url,
            has_completed_onboarding,
            free_events_created,
            location_city,
            location_state,
            location_country,
            location_lat,
            location_lng,
            interests,
            organizer_bio,
            organizer_website,
            organizer_twitter,
            organizer_instagram,
            organizer_linkedin,
            created_at: _,
            updated_at: _,
        } = value;

        // 所在地はオンボーディング完了時にまとめて入るので、
        // city と country が揃っているときだけ組み立てる
        let location = match (location_city, location_country) {
            (Some(city), Some(country)) => Some(UserLocation {
                city,
                state: location_state,
                country,
                lat: location_lat,
                lng: location_lng,
            }),
            _ => None,
        };

        let organizer_profile = if organizer_bio.is_some()
            || organizer_website.is_some()
            || organizer_twitter.is_some()
            || organizer_instagram.is_some()
            || organizer_linkedin.is_some()
        {
            Some(OrganizerProfile {
                bio: organizer_bio,
                website: organizer_website,
                social_links: SocialLinks {
                    twitter: organizer_twitter,
                    instagram: organizer_instagram,
                    linkedin: organizer_linkedin,
                },
            })
        } else {
            None
        };

        User {
            user_id,
            subject_id,
            name,
            email,
            image_url,
            has_completed_onboarding,
            free_events_created,
            location,
            interests,
            organizer_profile,
        }
    }
}

use derive_new::new;

use crate::model::{
    id::UserId,
    user::{SocialLinks, UserLocation},
};

#[derive(new, Debug)]
pub struct CompleteOnboarding {
    pub user_id: UserId,
    pub location: UserLocation,
    pub interests: Vec<String>,
}

#[derive(new, Debug)]
pub struct UpdateOrganizerProfile {
    pub user_id: UserId,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: SocialLinks,
}

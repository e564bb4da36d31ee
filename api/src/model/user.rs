use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::UserId,
    user::{
        event::{CompleteOnboarding, UpdateOrganizerProfile},
        OrganizerProfile, SocialLinks, User, UserLocation,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub has_completed_onboarding: bool,
    pub free_events_created: i32,
    pub location: Option<UserLocationResponse>,
    pub interests: Option<Vec<String>>,
    pub organizer_profile: Option<OrganizerProfileResponse>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            subject_id: _,
            name,
            email,
            image_url,
            has_completed_onboarding,
            free_events_created,
            location,
            interests,
            organizer_profile,
        } = value;
        Self {
            user_id,
            name,
            email,
            image_url,
            has_completed_onboarding,
            free_events_created,
            location: location.map(UserLocationResponse::from),
            interests,
            organizer_profile: organizer_profile.map(OrganizerProfileResponse::from),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocationResponse {
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<UserLocation> for UserLocationResponse {
    fn from(value: UserLocation) -> Self {
        let UserLocation {
            city,
            state,
            country,
            lat,
            lng,
        } = value;
        Self {
            city,
            state,
            country,
            lat,
            lng,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerProfileResponse {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: SocialLinksResponse,
}

impl From<OrganizerProfile> for OrganizerProfileResponse {
    fn from(value: OrganizerProfile) -> Self {
        let OrganizerProfile {
            bio,
            website,
            social_links,
        } = value;
        Self {
            bio,
            website,
            social_links: SocialLinksResponse {
                twitter: social_links.twitter,
                instagram: social_links.instagram,
                linkedin: social_links.linkedin,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksResponse {
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOnboardingRequest {
    #[garde(dive)]
    pub location: OnboardingLocationRequest,
    // 興味のあるカテゴリーは 3 つ以上選ばせる
    #[garde(length(min = 3))]
    pub interests: Vec<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingLocationRequest {
    #[garde(length(min = 1))]
    pub city: String,
    #[garde(skip)]
    pub state: Option<String>,
    #[garde(length(min = 1))]
    pub country: String,
    #[garde(skip)]
    pub lat: Option<f64>,
    #[garde(skip)]
    pub lng: Option<f64>,
}

#[derive(new)]
pub struct CompleteOnboardingRequestWithUserId(UserId, CompleteOnboardingRequest);

impl From<CompleteOnboardingRequestWithUserId> for CompleteOnboarding {
    fn from(value: CompleteOnboardingRequestWithUserId) -> Self {
        let CompleteOnboardingRequestWithUserId(
            user_id,
            CompleteOnboardingRequest {
                location,
                interests,
            },
        ) = value;
        CompleteOnboarding {
            user_id,
            location: UserLocation {
                city: location.city,
                state: location.state,
                country: location.country,
                lat: location.lat,
                lng: location.lng,
            },
            interests,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizerProfileRequest {
    #[garde(skip)]
    pub bio: Option<String>,
    #[garde(skip)]
    pub website: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub social_links: SocialLinksRequest,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksRequest {
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(new)]
pub struct UpdateOrganizerProfileRequestWithUserId(UserId, UpdateOrganizerProfileRequest);

impl From<UpdateOrganizerProfileRequestWithUserId> for UpdateOrganizerProfile {
    fn from(value: UpdateOrganizerProfileRequestWithUserId) -> Self {
        let UpdateOrganizerProfileRequestWithUserId(
            user_id,
            UpdateOrganizerProfileRequest {
                bio,
                website,
                social_links,
            },
        ) = value;
        UpdateOrganizerProfile {
            user_id,
            bio,
            website,
            social_links: SocialLinks {
                twitter: social_links.twitter,
                instagram: social_links.instagram,
                linkedin: social_links.linkedin,
            },
        }
    }
}

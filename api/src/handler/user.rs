use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::user::{
        CompleteOnboardingRequest, CompleteOnboardingRequestWithUserId,
        UpdateOrganizerProfileRequest, UpdateOrganizerProfileRequestWithUserId, UserResponse,
    },
};

pub async fn show_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}

pub async fn complete_onboarding(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CompleteOnboardingRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let event = CompleteOnboardingRequestWithUserId::new(user.id(), req);
    registry
        .user_repository()
        .complete_onboarding(event.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn update_organizer_profile(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateOrganizerProfileRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let event = UpdateOrganizerProfileRequestWithUserId::new(user.id(), req);
    registry
        .user_repository()
        .update_organizer_profile(event.into())
        .await
        .map(|_| StatusCode::OK)
}

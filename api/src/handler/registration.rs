use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{EventId, RegistrationId},
    registration::event::{CancelRegistration, CreateRegistration},
};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::registration::{
        CheckInRequest, CheckInResponse, CreateRegistrationResponse, RegistrationsResponse,
    },
};

// イベントへの参加登録（チケット発行）を行う
pub async fn register_for_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<(StatusCode, Json<CreateRegistrationResponse>)> {
    let create_registration = CreateRegistration::new(event_id, user.id());
    registry
        .registration_repository()
        .create(create_registration)
        .await
        .map(|registration_id| {
            (
                StatusCode::CREATED,
                Json(CreateRegistrationResponse { registration_id }),
            )
        })
}

pub async fn show_my_registrations(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RegistrationsResponse>> {
    registry
        .registration_repository()
        .find_by_user_id(user.id())
        .await
        .map(RegistrationsResponse::from)
        .map(Json)
}

pub async fn cancel_registration(
    user: AuthorizedUser,
    Path(registration_id): Path<RegistrationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    let cancel_registration = CancelRegistration::new(registration_id, user.id());
    registry
        .registration_repository()
        .cancel(cancel_registration)
        .await
        .map(|_| StatusCode::OK)
}

// QR コード（またはその手入力）によるチェックイン。
// 無効なコードやチェックイン済みは日常的に起こるので、
// HTTP エラーではなく success/message の結果として返す
pub async fn check_in_attendee(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CheckInRequest>,
) -> AppResult<Json<CheckInResponse>> {
    req.validate(&())?;

    registry
        .registration_repository()
        .check_in(&req.qr_code)
        .await
        .map(CheckInResponse::from)
        .map(Json)
}

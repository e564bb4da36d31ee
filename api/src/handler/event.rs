use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{event::event::DeleteEvent, id::EventId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::{AuthorizedUser, OptionalAuthorizedUser},
    model::event::{
        CreateEventRequest, CreateEventRequestWithOrganizerId, CreateEventResponse,
        EventListQuery, EventResponse, EventsResponse, UpdateEventRequest,
        UpdateEventRequestWithIds,
    },
};

pub async fn register_event(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<CreateEventResponse>)> {
    req.validate(&())?;

    let create_event = CreateEventRequestWithOrganizerId::new(user.id(), req).try_into()?;
    registry
        .event_repository()
        .create(create_event)
        .await
        .map(|event_id| {
            (
                StatusCode::CREATED,
                Json(CreateEventResponse { event_id }),
            )
        })
}

// 開催前のイベント一覧。認証なしで閲覧できる
pub async fn show_upcoming_events(
    Query(query): Query<EventListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    query.validate(&())?;

    registry
        .event_repository()
        .find_upcoming(query.into())
        .await
        .map(EventsResponse::from)
        .map(Json)
}

// 自分が主催するイベント一覧。未認証の場合はエラーではなく空の一覧を返す
pub async fn show_my_events(
    user: OptionalAuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    let Some(user) = user.0 else {
        return Ok(Json(EventsResponse { items: vec![] }));
    };

    registry
        .event_repository()
        .find_by_organizer(user.id())
        .await
        .map(EventsResponse::from)
        .map(Json)
}

pub async fn show_event(
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .event_repository()
        .find_by_id(event_id)
        .await
        .and_then(|event| match event {
            Some(event) => Ok(Json(event.into())),
            None => Err(AppError::EntityNotFound(format!(
                "イベント（{event_id}）が見つかりませんでした。"
            ))),
        })
}

pub async fn show_event_by_slug(
    Path(slug): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .event_repository()
        .find_by_slug(&slug)
        .await
        .and_then(|event| match event {
            Some(event) => Ok(Json(event.into())),
            None => Err(AppError::EntityNotFound(format!(
                "イベント（{slug}）が見つかりませんでした。"
            ))),
        })
}

pub async fn update_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let update_event = UpdateEventRequestWithIds::new(event_id, user.id(), req).try_into()?;
    registry
        .event_repository()
        .update(update_event)
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    let delete_event = DeleteEvent {
        event_id,
        requested_user: user.id(),
    };
    registry
        .event_repository()
        .delete(delete_event)
        .await
        .map(|_| StatusCode::OK)
}

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use kernel::model::{dashboard::EventStats, id::EventId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{extractor::AuthorizedUser, model::dashboard::EventDashboardResponse};

// イベントの統計ダッシュボード。主催者本人のみ閲覧できる
pub async fn show_event_dashboard(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventDashboardResponse>> {
    let event = registry
        .event_repository()
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("イベント（{event_id}）が見つかりませんでした。"))
        })?;

    if event.organizer.organizer_id != user.id() {
        return Err(AppError::ForbiddenOperation);
    }

    let registrations = registry
        .registration_repository()
        .find_states_by_event_id(event_id)
        .await?;

    let stats = EventStats::calculate(&event, &registrations, Utc::now());

    Ok(Json(EventDashboardResponse {
        event: event.into(),
        stats: stats.into(),
    }))
}

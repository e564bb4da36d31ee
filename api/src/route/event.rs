use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    dashboard::show_event_dashboard,
    event::{
        delete_event, register_event, show_event, show_event_by_slug, show_my_events,
        show_upcoming_events, update_event,
    },
    registration::register_for_event,
};

pub fn build_event_routers() -> Router<AppRegistry> {
    let events_routers = Router::new()
        .route("/", post(register_event))
        .route("/", get(show_upcoming_events))
        .route("/me", get(show_my_events))
        .route("/slug/:slug", get(show_event_by_slug))
        .route("/:event_id", get(show_event))
        .route("/:event_id", put(update_event))
        .route("/:event_id", delete(delete_event))
        .route("/:event_id/dashboard", get(show_event_dashboard))
        .route("/:event_id/registrations", post(register_for_event));

    Router::new().nest("/events", events_routers)
}

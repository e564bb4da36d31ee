use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::registration::{
    cancel_registration, check_in_attendee, show_my_registrations,
};

pub fn build_registration_routers() -> Router<AppRegistry> {
    let registrations_routers = Router::new()
        .route("/me", get(show_my_registrations))
        .route("/check-in", post(check_in_attendee))
        .route("/:registration_id/cancel", put(cancel_registration));

    Router::new().nest("/registrations", registrations_routers)
}

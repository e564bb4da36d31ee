use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{complete_onboarding, show_current_user, update_organizer_profile};

pub fn build_user_routers() -> Router<AppRegistry> {
    let users_routers = Router::new()
        .route("/me", get(show_current_user))
        .route("/onboarding", post(complete_onboarding))
        .route("/organizer-profile", put(update_organizer_profile));

    Router::new().nest("/users", users_routers)
}

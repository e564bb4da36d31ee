use derive_new::new;

use crate::model::id::{EventId, RegistrationId, UserId};

#[derive(new, Debug)]
pub struct CreateRegistration {
    pub event_id: EventId,
    pub user_id: UserId,
}

#[derive(new, Debug)]
pub struct CancelRegistration {
    pub registration_id: RegistrationId,
    pub requested_user: UserId,
}

use std::sync::Arc;

use crate::service::ContactService;

#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactService>,
}

impl AppState {
    pub fn new(contacts: Arc<ContactService>) -> Self {
        Self { contacts }
    }
}

use crate::portal::HttpPortal;
use crate::session::SessionController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController<HttpPortal>>,
}

impl AppState {
    pub fn new(controller: Arc<SessionController<HttpPortal>>) -> Self {
        Self { controller }
    }
}

use crate::db::SurveyStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SurveyStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        Self { store }
    }
}

pub type SharedState = Arc<AppState>;

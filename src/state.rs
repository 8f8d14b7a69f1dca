use std::sync::Arc;

use crate::db::TodoRepository;
use crate::error::AppError;
use crate::views::Templates;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TodoRepository>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Result<Self, AppError> {
        Ok(Self {
            repo,
            templates: Arc::new(Templates::new()?),
        })
    }
}

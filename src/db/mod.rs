pub mod memory;
pub mod repository;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{NewTodoItem, TodoItem, UpdateTodoItem};

pub use memory::InMemoryTodoRepository;
pub use repository::SqliteTodoRepository;

/// Storage contract for to-do items.
///
/// Listings are ordered by `created_at` descending. Unknown ids fail with
/// [`AppError::NotFound`], empty titles with [`AppError::Validation`].
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<TodoItem>, AppError>;
    async fn create(&self, new: NewTodoItem) -> Result<TodoItem, AppError>;
    async fn get(&self, id: i64) -> Result<TodoItem, AppError>;
    async fn update(&self, id: i64, changes: UpdateTodoItem) -> Result<TodoItem, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    async fn toggle(&self, id: i64) -> Result<TodoItem, AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

pub async fn open_repository(config: &Config) -> Result<Arc<dyn TodoRepository>, AppError> {
    match config.storage {
        StorageBackend::Sqlite => {
            info!("Opening SQLite store at {}", config.database_url);
            let repo: Arc<dyn TodoRepository> = Arc::new(
                SqliteTodoRepository::connect(&config.database_url, config.max_connections).await?,
            );
            Ok(repo)
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; items are lost on shutdown");
            let repo: Arc<dyn TodoRepository> = Arc::new(InMemoryTodoRepository::new());
            Ok(repo)
        }
    }
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::TodoRepository;
use crate::error::AppError;
use crate::forms::validate_title;
use crate::models::{NewTodoItem, TodoItem, UpdateTodoItem};

#[derive(Default)]
struct Store {
    last_id: i64,
    items: BTreeMap<i64, TodoItem>,
}

/// Process-local repository. Ids are never reused, matching the SQLite backend.
#[derive(Default)]
pub struct InMemoryTodoRepository {
    store: RwLock<Store>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list_all(&self) -> Result<Vec<TodoItem>, AppError> {
        let store = self.store.read().await;
        let mut todos: Vec<TodoItem> = store.items.values().cloned().collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(todos)
    }

    async fn create(&self, new: NewTodoItem) -> Result<TodoItem, AppError> {
        let title = validate_title(Some(new.title.as_str())).map_err(AppError::Validation)?;
        let now = Utc::now();

        let mut store = self.store.write().await;
        store.last_id += 1;
        let todo = TodoItem {
            id: store.last_id,
            title,
            description: new.description.unwrap_or_default(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        store.items.insert(todo.id, todo.clone());

        debug!("created todo {}", todo.id);
        Ok(todo)
    }

    async fn get(&self, id: i64) -> Result<TodoItem, AppError> {
        self.store
            .read()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i64, changes: UpdateTodoItem) -> Result<TodoItem, AppError> {
        let title = validate_title(Some(changes.title.as_str())).map_err(AppError::Validation)?;

        let mut store = self.store.write().await;
        let todo = store.items.get_mut(&id).ok_or(AppError::NotFound)?;
        todo.title = title;
        todo.description = changes.description;
        todo.completed = changes.completed;
        todo.updated_at = Utc::now();

        debug!("updated todo {}", id);
        Ok(todo.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        store.items.remove(&id).ok_or(AppError::NotFound)?;

        debug!("deleted todo {}", id);
        Ok(())
    }

    async fn toggle(&self, id: i64) -> Result<TodoItem, AppError> {
        let mut store = self.store.write().await;
        let todo = store.items.get_mut(&id).ok_or(AppError::NotFound)?;
        todo.completed = !todo.completed;
        todo.updated_at = Utc::now();

        debug!("toggled todo {} to completed={}", id, todo.completed);
        Ok(todo.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::db::TodoRepository;
use crate::error::AppError;
use crate::forms::validate_title;
use crate::models::{NewTodoItem, TodoItem, UpdateTodoItem};

const TODO_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

pub struct SqliteTodoRepository {
    db: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Opens the pool, creating the database file if needed, and applies migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn list_all(&self) -> Result<Vec<TodoItem>, AppError> {
        let todos = sqlx::query_as::<_, TodoItem>(&format!(
            "SELECT {TODO_COLUMNS} FROM todo_items ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(todos)
    }

    async fn create(&self, new: NewTodoItem) -> Result<TodoItem, AppError> {
        let title = validate_title(Some(new.title.as_str())).map_err(AppError::Validation)?;
        let description = new.description.unwrap_or_default();
        let now = Utc::now();

        let todo = sqlx::query_as::<_, TodoItem>(&format!(
            r#"
            INSERT INTO todo_items (title, description, completed, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?3)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(&title)
        .bind(&description)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        debug!("created todo {}", todo.id);
        Ok(todo)
    }

    async fn get(&self, id: i64) -> Result<TodoItem, AppError> {
        sqlx::query_as::<_, TodoItem>(&format!(
            "SELECT {TODO_COLUMNS} FROM todo_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i64, changes: UpdateTodoItem) -> Result<TodoItem, AppError> {
        let title = validate_title(Some(changes.title.as_str())).map_err(AppError::Validation)?;
        let now = Utc::now();

        let todo = sqlx::query_as::<_, TodoItem>(&format!(
            r#"
            UPDATE todo_items
            SET title = ?1,
                description = ?2,
                completed = ?3,
                updated_at = ?4
            WHERE id = ?5
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(&title)
        .bind(&changes.description)
        .bind(changes.completed)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)?;

        debug!("updated todo {}", id);
        Ok(todo)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let rows_affected = sqlx::query("DELETE FROM todo_items WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        debug!("deleted todo {}", id);
        Ok(())
    }

    async fn toggle(&self, id: i64) -> Result<TodoItem, AppError> {
        let now = Utc::now();

        // Flip in one statement so concurrent toggles serialize in SQLite.
        let todo = sqlx::query_as::<_, TodoItem>(&format!(
            r#"
            UPDATE todo_items
            SET completed = NOT completed,
                updated_at = ?1
            WHERE id = ?2
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(now)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)?;

        debug!("toggled todo {} to completed={}", id, todo.completed);
        Ok(todo)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}

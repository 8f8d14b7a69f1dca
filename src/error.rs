use axum::{http::StatusCode, response::{Html, IntoResponse, Response}};
use thiserror::Error;
use tracing::error;

use crate::forms::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Configuration error: {0}")]
    Config(String),
}

fn error_page(status: StatusCode, message: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html><head><title>{status}</title></head>\
         <body><h1>{status}</h1><p>{message}</p><p><a href=\"/\">Back to list</a></p></body></html>"
    ))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "No to-do item matches the given query."),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."),
            AppError::Validation(errors) => {
                // Handlers re-render forms themselves; this only fires if one forgets to.
                error!("unhandled validation error: {}", errors);
                (StatusCode::BAD_REQUEST, "Invalid input.")
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred.")
            }
            AppError::Migrate(e) => {
                error!("migration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
            AppError::Template(e) => {
                error!("template error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        };

        (status, error_page(status, message)).into_response()
    }
}

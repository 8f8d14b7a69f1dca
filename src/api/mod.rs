use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::AppError;
use crate::forms::{self, FieldErrors, TodoFormInput};
use crate::state::AppState;
use crate::views::FormView;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_todos))
        .route("/create/", get(create_form).post(create_todo))
        .route("/{id}/edit/", get(edit_form).post(update_todo))
        .route("/{id}/delete/", get(confirm_delete).post(delete_todo))
        .route("/{id}/toggle/", post(toggle_todo).fallback(method_not_allowed))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Ids are unsigned decimal digits; anything else can never match a row, so it
/// is treated as an unknown id.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound);
    }
    raw.parse::<i64>().map_err(|_| AppError::NotFound)
}

/// Reads the submitted form. Bodies that are not urlencoded are treated as an
/// empty submission so they reach validation instead of being rejected.
fn form_input(headers: &HeaderMap, body: &[u8]) -> TodoFormInput {
    let is_urlencoded = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        });

    if is_urlencoded {
        TodoFormInput::from_urlencoded(body)
    } else {
        TodoFormInput::default()
    }
}

fn redirect_to_list() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn render_invalid(
    state: &AppState,
    view: FormView<'_>,
    input: &TodoFormInput,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    warn!("rejected form submission: {}", errors);
    let view = view.with_submission(input, errors);
    Ok(state.templates.form(&view)?.into_response())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.repo.ping().await?;
    Ok(StatusCode::OK)
}

async fn list_todos(State(state): State<AppState>) -> Result<Response, AppError> {
    let todos = state.repo.list_all().await?;
    Ok(state.templates.list(&todos)?.into_response())
}

async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    Ok(state.templates.form(&FormView::create())?.into_response())
}

async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let input = form_input(&headers, &body);
    let new = match forms::clean_create(&input) {
        Ok(new) => new,
        Err(errors) => return render_invalid(&state, FormView::create(), &input, errors),
    };

    match state.repo.create(new).await {
        Ok(todo) => {
            info!("created todo {} ({})", todo.id, todo);
            Ok(redirect_to_list())
        }
        Err(AppError::Validation(errors)) => {
            render_invalid(&state, FormView::create(), &input, errors)
        }
        Err(e) => Err(e),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let todo = state.repo.get(parse_id(&id)?).await?;
    Ok(state.templates.form(&FormView::edit(&todo))?.into_response())
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let todo = state.repo.get(parse_id(&id)?).await?;
    let input = form_input(&headers, &body);

    let changes = match forms::clean_update(&input) {
        Ok(changes) => changes,
        Err(errors) => return render_invalid(&state, FormView::edit(&todo), &input, errors),
    };

    match state.repo.update(todo.id, changes).await {
        Ok(updated) => {
            info!("updated todo {}", updated.id);
            Ok(redirect_to_list())
        }
        Err(AppError::Validation(errors)) => {
            render_invalid(&state, FormView::edit(&todo), &input, errors)
        }
        Err(e) => Err(e),
    }
}

async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let todo = state.repo.get(parse_id(&id)?).await?;
    Ok(state.templates.confirm_delete(&todo)?.into_response())
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    state.repo.delete(id).await?;
    info!("deleted todo {}", id);
    Ok(redirect_to_list())
}

async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let todo = state.repo.toggle(parse_id(&id)?).await?;
    info!("toggled todo {} to completed={}", todo.id, todo.completed);
    Ok(redirect_to_list())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

//! Server-side HTML rendering.
//!
//! Templates live in `templates/` and are embedded at compile time, so the
//! binary has no runtime dependency on the working directory.

use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::AppError;
use crate::forms::{FieldErrors, TodoFormInput};
use crate::models::{TITLE_MAX_LENGTH, TodoItem};

pub const HOME_TEMPLATE: &str = "home.html";
pub const FORM_TEMPLATE: &str = "todo_form.html";
pub const CONFIRM_DELETE_TEMPLATE: &str = "todo_confirm_delete.html";

pub struct Templates {
    tera: Tera,
}

#[derive(Serialize)]
struct ListContext<'a> {
    todos: &'a [TodoItem],
}

#[derive(Serialize)]
struct ConfirmDeleteContext<'a> {
    todo: &'a TodoItem,
}

/// What the create/edit form shows: current values plus any field errors.
#[derive(Debug, Serialize)]
pub struct FormView<'a> {
    pub todo: Option<&'a TodoItem>,
    pub action: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub show_completed: bool,
    pub errors: FieldErrors,
    pub title_max_length: usize,
}

impl<'a> FormView<'a> {
    pub fn create() -> Self {
        Self {
            todo: None,
            action: "/create/".to_string(),
            title: String::new(),
            description: String::new(),
            completed: false,
            show_completed: false,
            errors: FieldErrors::new(),
            title_max_length: TITLE_MAX_LENGTH,
        }
    }

    pub fn edit(todo: &'a TodoItem) -> Self {
        Self {
            todo: Some(todo),
            action: format!("/{}/edit/", todo.id),
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            show_completed: true,
            errors: FieldErrors::new(),
            title_max_length: TITLE_MAX_LENGTH,
        }
    }

    /// Refills the form with what the user submitted so nothing is lost on error.
    pub fn with_submission(mut self, input: &TodoFormInput, errors: FieldErrors) -> Self {
        self.title = input.title.clone().unwrap_or_default();
        self.description = input.description.clone().unwrap_or_default();
        self.completed = crate::forms::parse_checkbox(input.completed.as_deref());
        self.errors = errors;
        self
    }
}

impl Templates {
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            (HOME_TEMPLATE, include_str!("../templates/home.html")),
            (FORM_TEMPLATE, include_str!("../templates/todo_form.html")),
            (
                CONFIRM_DELETE_TEMPLATE,
                include_str!("../templates/todo_confirm_delete.html"),
            ),
        ])?;
        Ok(Self { tera })
    }

    fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<Html<String>, AppError> {
        let context = Context::from_serialize(context)?;
        Ok(Html(self.tera.render(name, &context)?))
    }

    pub fn list(&self, todos: &[TodoItem]) -> Result<Html<String>, AppError> {
        self.render(HOME_TEMPLATE, &ListContext { todos })
    }

    pub fn form(&self, view: &FormView<'_>) -> Result<Html<String>, AppError> {
        self.render(FORM_TEMPLATE, view)
    }

    pub fn confirm_delete(&self, todo: &TodoItem) -> Result<Html<String>, AppError> {
        self.render(CONFIRM_DELETE_TEMPLATE, &ConfirmDeleteContext { todo })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample(id: i64, title: &str, completed: bool) -> TodoItem {
        let now = Utc::now();
        TodoItem {
            id,
            title: title.to_string(),
            description: String::new(),
            completed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_list_renders_items_and_escapes_titles() {
        let templates = Templates::new().unwrap();
        let todos = vec![sample(2, "<b>Bold</b>", true), sample(1, "Buy milk", false)];
        let Html(body) = templates.list(&todos).unwrap();

        assert!(body.contains("Buy milk"));
        assert!(body.contains("&lt;b&gt;Bold&lt;&#x2F;b&gt;"));
        assert!(body.contains(r#"action="/1/toggle/""#));
        assert!(body.contains(r#"class="todo completed""#));
    }

    #[test]
    fn test_empty_list() {
        let templates = Templates::new().unwrap();
        let Html(body) = templates.list(&[]).unwrap();
        assert!(body.contains("Nothing to do yet."));
    }

    #[test]
    fn test_form_shows_errors_and_submitted_values() {
        let templates = Templates::new().unwrap();
        let mut errors = FieldErrors::new();
        errors.add("title", crate::forms::REQUIRED_MESSAGE);
        let input = TodoFormInput {
            title: None,
            description: Some("Description only".to_string()),
            completed: None,
        };
        let view = FormView::create().with_submission(&input, errors);
        let Html(body) = templates.form(&view).unwrap();

        assert!(body.contains("This field is required."));
        assert!(body.contains("Description only"));
        assert!(!body.contains(r#"name="completed""#));
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let templates = Templates::new().unwrap();
        let todo = sample(7, "Original Title", true);
        let Html(body) = templates.form(&FormView::edit(&todo)).unwrap();

        assert!(body.contains(r#"action="/7/edit/""#));
        assert!(body.contains(r#"value="Original Title""#));
        assert!(body.contains("checked"));
    }

    #[test]
    fn test_confirm_delete() {
        let templates = Templates::new().unwrap();
        let todo = sample(3, "Todo to Delete", false);
        let Html(body) = templates.confirm_delete(&todo).unwrap();
        assert!(body.contains(r#"action="/3/delete/""#));
        assert!(body.contains("Todo to Delete"));
    }
}

//! Task items served under `/v1/todoitems`

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Resource;
use crate::handlers::query::{read_csv, ListQuery};
use crate::repository::{Entity, FieldValue, Filters, ListFilter, Record, Repository};
use crate::state::Models;
use crate::validator::{check_entries, check_required_text, Validator};

/// A task item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct Todo {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: Record,
    pub task_name: String,
    pub description: String,
    pub notes: String,
    pub category: String,
    pub priority: String,
    pub status: Vec<String>,
}

/// Filters accepted by `GET /v1/todoitems`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub task_name: String,
    pub priority: String,
    pub status: Vec<String>,
}

impl ListFilter for TodoFilter {
    fn text_terms(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("task_name", self.task_name.as_str()),
            ("priority", self.priority.as_str()),
        ]
    }

    fn tags(&self) -> &[String] {
        &self.status
    }
}

impl Entity for Todo {
    type Filter = TodoFilter;

    const KIND: &'static str = "todo";
    const TABLE: &'static str = "todos";
    const COLUMNS: &'static [&'static str] = &[
        "task_name",
        "description",
        "notes",
        "category",
        "priority",
        "status",
    ];
    const TAGS_COLUMN: &'static str = "status";
    const SORT_SAFELIST: &'static [&'static str] =
        &["id", "task_name", "priority", "-id", "-task_name", "-priority"];

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn validate(&self, v: &mut Validator) {
        check_required_text(v, &self.task_name, "task_name", 300);
        check_required_text(v, &self.description, "description", 800);
        check_required_text(v, &self.notes, "notes", 500);
        check_required_text(v, &self.category, "category", 200);
        check_required_text(v, &self.priority, "priority", 100);
        check_entries(v, &self.status, "status");
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("task_name", FieldValue::Text(self.task_name.clone())),
            ("description", FieldValue::Text(self.description.clone())),
            ("notes", FieldValue::Text(self.notes.clone())),
            ("category", FieldValue::Text(self.category.clone())),
            ("priority", FieldValue::Text(self.priority.clone())),
            ("status", FieldValue::List(self.status.clone())),
        ]
    }
}

/// Body of `POST /v1/todoitems`
///
/// Missing fields default to empty so they surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateTodo {
    pub task_name: String,
    pub description: String,
    pub notes: String,
    pub category: String,
    pub priority: String,
    pub status: Vec<String>,
}

/// Body of `PATCH /v1/todoitems/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodo {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<Vec<String>>,
}

/// Query string of `GET /v1/todoitems`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoQuery {
    pub task_name: Option<String>,
    pub priority: Option<String>,
    /// Comma-separated statuses
    pub status: Option<String>,
    #[serde(flatten)]
    pub list: ListQuery,
}

impl Resource for Todo {
    type Create = CreateTodo;
    type Patch = UpdateTodo;
    type Query = TodoQuery;

    const ITEM_KEY: &'static str = "todo";
    const LIST_KEY: &'static str = "todos";
    const COLLECTION_PATH: &'static str = "/v1/todoitems";
    const DELETED_MESSAGE: &'static str = "todo item successfully deleted";

    fn from_create(input: CreateTodo) -> Self {
        Self {
            record: Record::default(),
            task_name: input.task_name,
            description: input.description,
            notes: input.notes,
            category: input.category,
            priority: input.priority,
            status: input.status,
        }
    }

    fn apply_patch(&mut self, patch: UpdateTodo) {
        if let Some(task_name) = patch.task_name {
            self.task_name = task_name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn list_params(query: &TodoQuery, v: &mut Validator) -> (TodoFilter, Filters) {
        let filter = TodoFilter {
            task_name: query.task_name.clone().unwrap_or_default(),
            priority: query.priority.clone().unwrap_or_default(),
            status: read_csv(query.status.as_deref()),
        };
        (filter, query.list.filters(Self::SORT_SAFELIST, v))
    }

    fn repository(models: &Models) -> Arc<dyn Repository<Self>> {
        Arc::clone(&models.todos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Todo {
        Todo {
            task_name: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            notes: "Ask finance for the export".to_string(),
            category: "work".to_string(),
            priority: "high".to_string(),
            status: vec!["urgent".to_string(), "open".to_string()],
            ..Todo::default()
        }
    }

    fn errors(todo: &Todo) -> Validator {
        let mut v = Validator::new();
        todo.validate(&mut v);
        v
    }

    #[test]
    fn test_valid_todo_passes() {
        assert!(errors(&valid()).valid());
    }

    #[test]
    fn test_required_fields() {
        let v = errors(&Todo::default());
        for key in ["task_name", "description", "notes", "category", "priority"] {
            assert_eq!(v.errors()[key], "must be provided", "{key}");
        }
        assert_eq!(v.errors()["status"], "must contain at least 1 entry");
    }

    #[test]
    fn test_length_limits() {
        let mut todo = valid();
        todo.task_name = "x".repeat(301);
        todo.description = "x".repeat(801);
        todo.notes = "x".repeat(501);
        todo.category = "x".repeat(201);
        todo.priority = "x".repeat(101);
        let v = errors(&todo);
        assert_eq!(v.errors()["task_name"], "must not be more than 300 bytes long");
        assert_eq!(v.errors()["description"], "must not be more than 800 bytes long");
        assert_eq!(v.errors()["notes"], "must not be more than 500 bytes long");
        assert_eq!(v.errors()["category"], "must not be more than 200 bytes long");
        assert_eq!(v.errors()["priority"], "must not be more than 100 bytes long");
    }

    #[test]
    fn test_limits_are_inclusive() {
        let mut todo = valid();
        todo.task_name = "x".repeat(300);
        todo.priority = "x".repeat(100);
        assert!(errors(&todo).valid());
    }

    #[test]
    fn test_status_rules() {
        let mut todo = valid();
        todo.status = vec!["a".to_string(), "a".to_string()];
        assert_eq!(errors(&todo).errors()["status"], "must not contain duplicate entries");

        todo.status = (0..6).map(|i| format!("s{i}")).collect();
        assert_eq!(errors(&todo).errors()["status"], "must not contain more than 5 entries");
    }

    #[test]
    fn test_fields_follow_column_order() {
        let columns: Vec<&str> = valid().fields().into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, Todo::COLUMNS);
    }

    #[test]
    fn test_serializes_flat() {
        let value = serde_json::to_value(valid()).unwrap();
        assert_eq!(value["id"], 0);
        assert_eq!(value["version"], 0);
        assert_eq!(value["task_name"], "Write report");
        assert_eq!(value["status"][0], "urgent");
    }

    #[test]
    fn test_create_rejects_unknown_fields() {
        let result: Result<CreateTodo, _> =
            serde_json::from_str(r#"{"task_name": "x", "id": 4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_missing_fields_default_to_empty() {
        let input: CreateTodo = serde_json::from_str(r#"{"task_name": "x"}"#).unwrap();
        let todo = Todo::from_create(input);
        assert_eq!(todo.task_name, "x");
        assert!(todo.status.is_empty());
        assert_eq!(todo.record, Record::default());
    }

    #[test]
    fn test_patch_changes_only_present_fields() {
        let mut todo = valid();
        let patch: UpdateTodo =
            serde_json::from_str(r#"{"priority": "low", "status": ["done"]}"#).unwrap();
        todo.apply_patch(patch);

        assert_eq!(todo.priority, "low");
        assert_eq!(todo.status, vec!["done"]);
        assert_eq!(todo.task_name, "Write report");
    }

    #[test]
    fn test_list_params() {
        let query = TodoQuery {
            task_name: Some("report".to_string()),
            status: Some("urgent,open".to_string()),
            ..TodoQuery::default()
        };
        let mut v = Validator::new();
        let (filter, filters) = Todo::list_params(&query, &mut v);

        assert!(v.valid());
        assert_eq!(filter.task_name, "report");
        assert_eq!(filter.priority, "");
        assert_eq!(filter.status, vec!["urgent", "open"]);
        assert_eq!(filters.sort_safelist, Todo::SORT_SAFELIST);
    }
}

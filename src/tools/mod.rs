//! Function declarations advertised to the model, and the dispatch table that runs them.
//!
//! Each operation has a parameter struct deriving [`JsonSchema`]; [`declarations`]
//! turns those into the schema the model sees, and [`TodoTools::call`] maps a
//! function name back onto the matching accessor in [`crate::todo::store`].

pub mod create_todo;
pub mod delete_todo;
pub mod list_todos;
pub mod search_todos;

use create_todo::CreateTodoParams;
use delete_todo::DeleteTodoParams;
use list_todos::ListTodosParams;
use rusqlite::Connection;
use schemars::{schema_for, JsonSchema};
use search_todos::SearchTodosParams;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};

use crate::llm::FunctionDeclaration;
use crate::todo::Todo;

pub const CREATE_TODO: &str = "create_todo";
pub const LIST_TODOS: &str = "list_todos";
pub const SEARCH_TODOS: &str = "search_todos";
pub const DELETE_TODO: &str = "delete_todo";

fn declaration<P: JsonSchema>(name: &str, description: &str) -> FunctionDeclaration {
    let mut schema = schema_for!(P);
    // The API wants a bare object schema.
    schema.remove("$schema");
    FunctionDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters: schema.to_value(),
    }
}

/// The four functions the model may call.
pub fn declarations() -> Vec<FunctionDeclaration> {
    vec![
        declaration::<CreateTodoParams>(CREATE_TODO, "Add a new item to the to-do list."),
        declaration::<ListTodosParams>(LIST_TODOS, "List every item on the to-do list."),
        declaration::<SearchTodosParams>(
            SEARCH_TODOS,
            "Find to-do items whose text contains the query, case-insensitively.",
        ),
        declaration::<DeleteTodoParams>(DELETE_TODO, "Delete a to-do item by its numeric id."),
    ]
}

/// Dispatch table from function names to to-do accessors.
///
/// Holds the shared connection; every call runs on a blocking thread.
#[derive(Clone)]
pub struct TodoTools {
    db: Arc<Mutex<Connection>>,
}

impl TodoTools {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Run the function `name` with JSON `arguments`, returning a JSON result string.
    ///
    /// Errors are plain messages meant to be shown to the model or the user.
    pub async fn call(&self, name: &str, arguments: &serde_json::Value) -> Result<String, String> {
        tracing::info!(function = name, "function call");

        let result = match name {
            CREATE_TODO => {
                let params: CreateTodoParams = parse_args(name, arguments)?;
                let todo = self
                    .with_db(move |conn| crate::todo::store::create_todo(conn, &params.text))
                    .await?;
                serde_json::to_value(todo)
            }
            LIST_TODOS => {
                let _params: ListTodosParams = parse_args(name, arguments)?;
                let todos = self
                    .with_db(|conn| crate::todo::store::list_todos(conn))
                    .await?;
                Ok(todo_list_json(todos))
            }
            SEARCH_TODOS => {
                let params: SearchTodosParams = parse_args(name, arguments)?;
                let todos = self
                    .with_db(move |conn| crate::todo::store::search_todos(conn, &params.query))
                    .await?;
                Ok(todo_list_json(todos))
            }
            DELETE_TODO => {
                let params: DeleteTodoParams = parse_args(name, arguments)?;
                let todo = self
                    .with_db(move |conn| crate::todo::store::delete_todo(conn, params.id))
                    .await?;
                Ok(serde_json::json!({ "deleted": todo }))
            }
            other => return Err(format!("unknown function: {other}")),
        };

        result
            .map(|value| value.to_string())
            .map_err(|e| format!("serialization failed: {e}"))
    }

    /// Run a sync DB operation on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| e.to_string())
    }
}

fn parse_args<P: DeserializeOwned>(name: &str, arguments: &serde_json::Value) -> Result<P, String> {
    // Some models send `null` instead of `{}` for argument-less calls.
    let arguments = if arguments.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments).map_err(|e| format!("invalid arguments for {name}: {e}"))
}

fn todo_list_json(todos: Vec<Todo>) -> serde_json::Value {
    serde_json::json!({
        "count": todos.len(),
        "todos": todos,
    })
}

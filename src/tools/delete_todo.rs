//! `delete_todo` function parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `delete_todo` function.
///
/// The model is expected to look the id up with `list_todos` or `search_todos` first.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTodoParams {
    #[schemars(description = "Numeric id of the to-do to delete")]
    pub id: i64,
}

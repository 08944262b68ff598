use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `list_todos` takes no arguments.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListTodosParams {}

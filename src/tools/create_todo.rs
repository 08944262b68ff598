//! `create_todo` function parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `create_todo` function.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTodoParams {
    #[schemars(description = "The text of the to-do item, e.g. 'buy milk'")]
    pub text: String,
}

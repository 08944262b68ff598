use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchTodosParams {
    #[schemars(
        description = "Text to look for. Matches any to-do whose text contains it, ignoring case."
    )]
    pub query: String,
}

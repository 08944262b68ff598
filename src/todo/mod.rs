pub mod store;
pub mod types;

pub use types::Todo;

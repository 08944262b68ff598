//! A to-do list you manage by talking to it.
//!
//! `todo-chat` reads prompts from the terminal and forwards them to a hosted
//! chat model that supports function calling. The model decides which of four
//! operations to run (create, list, search, delete); the result goes back to
//! the model and its answer is printed.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization and schema
//! - [`todo`] — The `todos` table and its four query wrappers
//! - [`tools`] — Function declarations and the name → accessor dispatch table
//! - [`llm`] — Chat model trait, OpenAI-compatible client, and chat session
//! - [`chat`] — The interactive prompt loop
//! - [`cli`] — Subcommand entry points

pub mod chat;
pub mod cli;
pub mod config;
pub mod db;
pub mod llm;
pub mod todo;
pub mod tools;

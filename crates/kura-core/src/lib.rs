//! Core library for the A.R.M site.
//!
//! - `store` / `app`: the persisted entity store and the `AppState`
//!   controller that owns hydrated state and writes every change through
//! - `offline`: the stale-while-revalidate cache worker
//! - `assistant`: chatbot and content studio over the hosted model
//! - `intake`: membership form and simulated donation flow

pub mod app;
pub mod assistant;
pub mod config;
pub mod document;
pub mod intake;
pub mod models;
pub mod offline;
pub mod storage;
pub mod store;

pub use app::AppState;
pub use config::Config;
pub use document::{Document, DocumentState};

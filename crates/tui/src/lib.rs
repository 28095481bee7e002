//! # Notepal TUI
//!
//! A terminal host for the Notepal command palette. It shows the open story,
//! a draft field the palette can insert into, and a status line, and it
//! applies the palette's effects to an in-memory item registry.
//!
//! ## Key Features
//!
//! - Ctrl+P opens the palette over the draft; Ctrl+O seeds it with the draft's selection
//! - Arrow keys, Enter (Shift or Alt to keep the palette open), Escape and mouse clicks
//! - Tab splices the selected result into the draft
//! - Navigation updates the story list and the persisted navigation history
//!
//! ## Architecture
//!
//! - **`app`**: host state and key routing into the engine
//! - **`effects`**: applies engine effects to the registry and the draft
//! - **`ui`**: ratatui rendering, themes and the event loop

pub mod app;
mod effects;
pub mod ui;

use std::sync::Arc;

use anyhow::Result;
use notepal_registry::ItemRegistry;
use notepal_util::DocumentStore;

pub use app::App;

/// Runs the terminal host until the user quits.
///
/// # Errors
///
/// Fails when the terminal cannot be put into raw mode or drawn to.
pub async fn run(registry: Arc<ItemRegistry>, store: Arc<dyn DocumentStore>) -> Result<()> {
    ui::runtime::run_app(registry, store).await
}

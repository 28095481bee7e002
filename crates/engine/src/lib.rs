//! # Notepal Engine
//!
//! The Notepal Engine is a text-command router and incremental search engine
//! for a note-taking wiki: a single-line palette that dispatches what the user
//! types to a provider chosen by the leading symbol, shows a capped result
//! list, and resolves the chosen row into [`Effect`](notepal_types::Effect)s
//! the host carries out.
//!
//! ## Key Features
//!
//! - **Symbol Dispatch**: `>` commands, `#` tags, `@` tagged items, `?` help,
//!   `[` filters, `+` item creation and `|` settings; literal triggers win over symbols
//! - **Custom Commands**: commands declared by tagged items (prompt, prompt-basic,
//!   message, action string, history picker, shortcut triggers)
//! - **Multi-step Flows**: command wizard, tag add/remove, explorer, setting editor,
//!   theme picker, each with a single Escape continuation
//! - **Typed Settings**: decoded and backfilled once, persisted through a
//!   [`DocumentStore`](notepal_util::DocumentStore)
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use notepal_engine::PaletteEngine;
//! use notepal_registry::{ItemRegistry, RegistryFixture};
//! use notepal_types::{HostMessage, Item, OpenRequest};
//! use notepal_util::InMemoryDocumentStore;
//!
//! let registry = ItemRegistry::from_fixture(RegistryFixture {
//!     items: vec![Item::new("Meeting Notes")],
//!     shadows: vec![],
//! });
//! let mut engine = PaletteEngine::new(Arc::new(registry), Arc::new(InMemoryDocumentStore::new()));
//!
//! engine.handle_message(HostMessage::OpenPalette(OpenRequest::default()));
//! engine.on_input("meeting");
//! assert_eq!(engine.rows()[0].name, "Meeting Notes");
//! ```
//!
//! ## Architecture
//!
//! - **`dispatch`**: symbol table and input parsing into provider/resolver pairs
//! - **`providers`**: result providers and their resolvers
//! - **`wizard`**: flows that freeze dispatch while collecting input
//! - **`results`**: capped result list with selection and scrolling
//! - **`settings`**, **`history`**, **`search_steps`**, **`commands`**: persisted
//!   configuration and the command set

pub mod commands;
pub mod dispatch;
mod engine;
pub mod history;
pub mod keys;
pub mod providers;
pub mod results;
pub mod search_steps;
pub mod settings;
pub mod view;
mod wizard;

pub use commands::{Command, CommandKind, CommandSet, HistoryMode, Trigger};
pub use dispatch::{Dispatch, Provider, Resolver, Symbol, WizardStep, parse_command};
pub use engine::PaletteEngine;
pub use history::{CommandHistory, DEFAULT_HISTORY_LIMIT, navigation_history, record_navigation};
pub use providers::{TagQuery, parse_tags};
pub use results::{ResultList, ResultRow, RowAction};
pub use search_steps::{SearchStep, default_search_steps, load_search_steps};
pub use settings::{SettingError, SettingKey, SettingKind, SettingValue, Settings};
pub use view::{PaletteView, UiSink, ViewRow};

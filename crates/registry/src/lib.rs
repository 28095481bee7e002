//! Registry crate holding the wiki items the palette searches.
//!
//! [`ItemRegistry`] is an in-memory [`notepal_types::Repository`] loaded from a
//! JSON or YAML fixture. It evaluates the filter language used by the palette
//! and offers the handful of mutations the host applies in response to
//! palette effects (tagging, creating items, opening items in the story).

mod filter;
pub mod fixture;
pub mod models;

pub use filter::evaluate;
pub use fixture::{FIXTURE_PATH_ENV, FixtureError, RegistryFixture, default_fixture_path};
pub use models::{Catalog, ItemRegistry, STORY_LIST_TITLE, SYSTEM_PREFIX};

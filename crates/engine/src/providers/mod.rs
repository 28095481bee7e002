//! Result providers and their resolvers, one module per symbol family.
//!
//! Every provider sets the hint label and replaces the result list; every
//! resolver guards against an empty selection instead of failing.

mod action;
mod default;
mod explorer;
mod filter;
mod help;
mod history;
mod settings;
mod tags;

pub use tags::{TagQuery, parse_tags};

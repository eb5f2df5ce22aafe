//! Core of an application launcher: desktop-entry ingestion, incremental
//! longest-common-substring ranking, prefix routing to other search
//! backends, and supersession of stale background searches.

pub mod backends;
pub mod catalog;
pub mod config;
pub mod desktop_entry;
pub mod error;
pub mod exec;
pub mod executor;
pub mod launcher;
pub mod matcher;
pub mod model;
pub mod router;
pub mod searcher;
pub mod sources;
pub mod state;

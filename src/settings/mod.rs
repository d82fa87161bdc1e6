//! Settings persistence.
//!
//! A single JSON file (`settings.json`) beside the executable holds all
//! user-facing configuration. The store exposes both the structured record
//! and raw key access for older files that stored values key by key.

pub mod model;
pub mod store;

pub use model::Settings;
pub use store::{SettingsError, SettingsStore};

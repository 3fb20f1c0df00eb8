//! Resolvers turning parsed expressions into numbers and dates

pub mod date;
pub mod value;

pub use date::{TriggerTable, resolve_date};
pub use value::{Resolved, SettingsTable};

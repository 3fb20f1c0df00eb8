//! Command-line front end for the finmodel evaluation engine
//!
//! Loads a model file, evaluates it and prints the ledger, a summary or
//! chart series. All modelling happens in `finmodel_core`.

pub mod loader;
pub mod logging;
pub mod report;

pub use loader::{LoadError, ModelFormat, load_model};
pub use logging::init_logging;
pub use report::{OutputFormat, render_chart, render_ledger, render_summary};

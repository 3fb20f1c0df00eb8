//! Fluent builders for models
//!
//! Models are plain string-typed `ModelData`, which is tedious to write by
//! hand in tests and benchmarks. The builders fill in the strings:
//!
//! ```ignore
//! use finmodel_core::config::{AssetBuilder, FlowBuilder, ModelBuilder, TransactionBuilder};
//!
//! let model = ModelBuilder::new()
//!     .view_range("1 Jan 2018", "1 Jan 2020")
//!     .cpi(2.0)
//!     .cash("1 Jan 2018", 500.0)
//!     .asset(AssetBuilder::new("Shares").start("1 Jan 2018").value(10_000.0).growth(5.0))
//!     .flow(FlowBuilder::income("Salary")
//!         .start("1 Jan 2018")
//!         .value(2_000.0)
//!         .monthly()
//!         .liability("Joe(incomeTax)/Joe(NI)"))
//!     .transaction(TransactionBuilder::liquidate("Sell shares")
//!         .date("1 Jun 2019")
//!         .from("Shares")
//!         .from_proportion(0.5)
//!         .to("Cash"))
//!     .build();
//! ```

mod asset_builder;
mod builder;
mod flow_builder;
mod transaction_builder;

pub use asset_builder::AssetBuilder;
pub use builder::ModelBuilder;
pub use flow_builder::FlowBuilder;
pub use transaction_builder::TransactionBuilder;

/// Render a number the way a model author would type it
pub(crate) fn number_text(value: f64) -> String {
    value.to_string()
}

fn flag_text(value: bool) -> String {
    if value { "T" } else { "F" }.to_string()
}

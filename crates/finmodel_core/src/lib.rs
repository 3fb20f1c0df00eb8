//! Household finance evaluation engine
//!
//! This crate walks a household's finances forward in time from a
//! declarative model and produces a chronological ledger of value changes.
//! It supports:
//! - Assets, debts and quantized holdings with growth and CPI
//! - Recurring incomes and expenses paid through cash
//! - Transactions: transfers, sales, debt repayment, revaluations, bonds
//!   and automatic top-ups
//! - Cost-basis tracking and UK income tax, NI and CGT settled each
//!   5 April
//! - Aggregation of the ledger into per-period chart series
//!
//! # Builder DSL
//!
//! ```ignore
//! use finmodel_core::{AssetBuilder, FlowBuilder, ModelBuilder, evaluate};
//!
//! let model = ModelBuilder::new()
//!     .view_range("1 Jan 2018", "1 Jan 2020")
//!     .cash("1 Jan 2018", 500.0)
//!     .flow(FlowBuilder::income("Salary")
//!         .start("10 Mar 2018")
//!         .value(12_600.0)
//!         .recurrence("1y")
//!         .liability("Joe(incomeTax)"))
//!     .build();
//!
//! let ledger = evaluate(&model)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod apply;
pub mod chart;
pub mod convert;
pub mod cost_basis;
pub mod date_math;
pub mod error;
pub mod evaluate;
pub mod evaluation_state;
pub mod growth;
pub mod recurrence;
pub mod resolve;
pub mod summary;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use chart::{ChartData, ViewSettings, make_chart_data};
pub use config::{AssetBuilder, FlowBuilder, ModelBuilder, TransactionBuilder};
pub use error::{ChartError, EvaluationError, InvariantError, ResolveError};
pub use evaluate::{evaluate, evaluate_many, evaluate_parsed};
pub use model::{Evaluation, ModelData};
pub use summary::ModelSummary;

//! Scenario tests for the evaluation engine
//!
//! Tests are organized by topic:
//! - `basic` - Core evaluation mechanics, growth and ordering
//! - `taxes` - Income tax, NI and CGT settlement at tax-year boundaries
//! - `quantized` - Unit holdings and cost basis
//! - `transactions` - Each transaction type and its policy checks
//! - `charts` - Aggregation of the ledger into chart series

mod quantized;
mod transactions;

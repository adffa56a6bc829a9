//! Profitability predictors - earnings relative to the asset base

pub mod roa;

pub use roa::Roa;

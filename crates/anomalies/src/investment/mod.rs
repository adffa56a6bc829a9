//! Investment predictors - balance-sheet expansion
//!
//! Firms whose operating assets have run ahead of their funding tend to
//! earn lower subsequent returns.

pub mod noa;

pub use noa::Noa;

//! Issuance predictors - net equity issuance
//!
//! Firms that issue equity tend to underperform; firms that repurchase
//! tend to outperform.

pub mod composite_equity;
pub mod nsi;

pub use composite_equity::CompEquIss;
pub use nsi::Nsi;

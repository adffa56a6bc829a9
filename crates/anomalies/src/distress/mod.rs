//! Distress predictors - probability of bankruptcy

pub mod oscore;

pub use oscore::OScore;

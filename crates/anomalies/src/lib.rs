#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/anomalies/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod asof;
pub mod calendar;
pub mod distress;
pub mod error;
pub mod investment;
pub mod issuance;
pub mod lag;
pub mod math;
pub mod output;
pub mod profitability;
pub mod registry;
pub mod tables;
pub mod traits;
pub mod warehouse;

// Re-export core types
pub use asof::{AsOfKeys, asof_merge};
pub use calendar::YearMonth;
pub use error::{Result, SignalError};
pub use lag::{keep_first, multi_lag};
pub use output::{normalize, write_csv};
pub use registry::{PredictorCategory, PredictorInfo, PredictorRegistry};
pub use tables::{Table, TableInput, TableSet};
pub use traits::{ConfigurablePredictor, Predictor, PredictorConfig};
pub use warehouse::WarehouseConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

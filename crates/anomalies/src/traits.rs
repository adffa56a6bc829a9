//! Core trait definitions for predictors.
//!
//! All predictors implement the [`Predictor`] trait, which provides a unified
//! interface for turning intermediate panels into a standardized signal file.

use crate::{PredictorCategory, Result, TableInput, TableSet};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A published anomaly signal computed from intermediate panels.
pub trait Predictor: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this predictor, also the output column and file name.
    fn name(&self) -> &str;

    /// Human-readable description of what this predictor measures.
    fn description(&self) -> &str;

    /// Predictor category for grouping.
    fn category(&self) -> PredictorCategory;

    /// Tables and columns read by this predictor.
    fn inputs(&self) -> &[TableInput];

    /// Months between the availability of the inputs and the release of the signal.
    fn publication_lag(&self) -> u32;

    /// Compute raw signal values.
    ///
    /// Returns a DataFrame with columns `permno`, `time_avail_m` and the
    /// predictor name. Missing signals are kept as nulls.
    fn compute_raw(&self, tables: &TableSet) -> Result<DataFrame>;

    /// Compute the standardized output table.
    ///
    /// This is the primary computation method: it computes raw values and
    /// then applies the publication lag and output normalization.
    fn compute(&self, tables: &TableSet) -> Result<DataFrame> {
        let raw = self.compute_raw(tables)?;
        crate::output::normalize(raw.lazy(), self.name(), self.publication_lag())
    }
}

/// Runtime configuration shared by all predictors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Months to delay the signal's availability after its inputs become known.
    pub publication_lag: u32,
}

impl PredictorConfig {
    /// Configuration with the given publication lag.
    pub const fn with_publication_lag(publication_lag: u32) -> Self {
        Self { publication_lag }
    }
}

/// A predictor that supports runtime configuration.
pub trait ConfigurablePredictor: Predictor {
    /// Create a new predictor with the given configuration.
    fn with_config(config: PredictorConfig) -> Self;

    /// Returns the current configuration.
    fn config(&self) -> &PredictorConfig;
}

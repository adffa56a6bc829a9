//! Net Share Issuance (NSI) predictor.
//!
//! Fama and French (2008): the annual log change in split-adjusted shares
//! outstanding.

use crate::{
    ConfigurablePredictor, Predictor, PredictorCategory, PredictorConfig, Result, TableInput,
    TableSet,
    lag::{keep_first, lag_name, multi_lag},
    math::{safe_div, safe_log},
    tables::{PERMNO, TIME_AVAIL_M, Table},
};
use polars::prelude::*;
use tracing::info;

const INPUTS: &[TableInput] = &[TableInput {
    table: Table::AnnualCompustat,
    columns: &[PERMNO, TIME_AVAIL_M, "csho", "ajex"],
}];

/// Net Share Issuance predictor.
///
/// ```text
/// NSI = ln( (CSHO_t * AJEX_t) / (CSHO_{t-12} * AJEX_{t-12}) )
/// ```
#[derive(Debug, Clone, Default)]
pub struct Nsi {
    config: PredictorConfig,
}

impl Predictor for Nsi {
    fn name(&self) -> &str {
        "NSI"
    }

    fn description(&self) -> &str {
        "Net share issuance - annual log change in split-adjusted shares"
    }

    fn category(&self) -> PredictorCategory {
        PredictorCategory::Issuance
    }

    fn inputs(&self) -> &[TableInput] {
        INPUTS
    }

    fn publication_lag(&self) -> u32 {
        self.config.publication_lag
    }

    fn compute_raw(&self, tables: &TableSet) -> Result<DataFrame> {
        let loaded = tables.scan(&INPUTS[0])?.collect()?;
        info!(rows = loaded.height(), "NSI rows loaded");

        let panel = keep_first(loaded.lazy(), PERMNO, TIME_AVAIL_M).collect()?;
        info!(rows = panel.height(), "NSI panel after dedupe on permno-month");

        let panel = panel
            .lazy()
            .with_column((col("csho") * col("ajex")).alias("shares_adj"));

        let shares_lag = lag_name("shares_adj", 12);
        let result = multi_lag(panel, PERMNO, TIME_AVAIL_M, "shares_adj", &[12])?
            .select([
                col(PERMNO),
                col(TIME_AVAIL_M),
                safe_log(safe_div(col("shares_adj"), col(shares_lag.as_str())))
                    .alias(self.name()),
            ])
            .collect()?;

        info!(
            rows = result.height(),
            computed = result.height() - result.column(self.name())?.null_count(),
            "NSI calculated"
        );
        Ok(result)
    }
}

impl ConfigurablePredictor for Nsi {
    fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

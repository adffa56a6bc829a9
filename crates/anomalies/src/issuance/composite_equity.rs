//! Composite Equity Issuance (CompEquIss) predictor.
//!
//! Daniel and Titman (2006), on a one-year horizon: the part of the growth in
//! market value that is not explained by the stock's return. Positive values
//! mean net issuance, negative values net repurchases.

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
    table: Table::SignalMaster,
    columns: &[PERMNO, TIME_AVAIL_M, "ret", "mve_c"],
}];

/// Months between the market data and the release of the signal.
///
/// Aligns the release with annual accounting signals such as NSI.
pub const DEFAULT_PUBLICATION_LAG: u32 = 4;

/// Composite Equity Issuance predictor.
///
/// ```text
/// Idx_t      = prod_{s <= t} (1 + RET_s)
/// BH_t       = (Idx_t - Idx_{t-12}) / Idx_{t-12}
/// CompEquIss = ln(ME_t / ME_{t-12}) - BH_t
/// ```
#[derive(Debug, Clone)]
pub struct CompEquIss {
    config: PredictorConfig,
}

impl Default for CompEquIss {
    fn default() -> Self {
        Self {
            config: PredictorConfig::with_publication_lag(DEFAULT_PUBLICATION_LAG),
        }
    }
}

impl Predictor for CompEquIss {
    fn name(&self) -> &str {
        "CompEquIss"
    }

    fn description(&self) -> &str {
        "Composite equity issuance - 12-month log market value growth minus buy-and-hold return"
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
        info!(rows = loaded.height(), "CompEquIss rows loaded");

        let panel = keep_first(loaded.lazy(), PERMNO, TIME_AVAIL_M).collect()?;
        info!(rows = panel.height(), "CompEquIss panel after dedupe on permno-month");

        let panel = panel
            .lazy()
            .sort(
                [PERMNO, TIME_AVAIL_M],
                SortMultipleOptions::default()
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            )
            .with_column(
                (lit(1.0) + col("ret"))
                    .cum_prod(false)
                    .over([col(PERMNO)])
                    .alias("ret_index"),
            );

        let lagged = multi_lag(panel, PERMNO, TIME_AVAIL_M, "ret_index", &[12])?;
        let lagged = multi_lag(lagged, PERMNO, TIME_AVAIL_M, "mve_c", &[12])?;

        let index_lag = lag_name("ret_index", 12);
        let mve_lag = lag_name("mve_c", 12);
        let result = lagged
            .with_column(
                safe_div(
                    col("ret_index") - col(index_lag.as_str()),
                    col(index_lag.as_str()),
                )
                .alias("buy_hold"),
            )
            .select([
                col(PERMNO),
                col(TIME_AVAIL_M),
                (safe_log(safe_div(col("mve_c"), col(mve_lag.as_str()))) - col("buy_hold"))
                    .alias(self.name()),
            ])
            .collect()?;

        info!(
            rows = result.height(),
            computed = result.height() - result.column(self.name())?.null_count(),
            "CompEquIss calculated"
        );
        Ok(result)
    }
}

impl ConfigurablePredictor for CompEquIss {
    fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

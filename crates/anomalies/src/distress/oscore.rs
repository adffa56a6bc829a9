//! Ohlson (1980) O-score predictor.
//!
//! A logit-weighted combination of size, leverage, liquidity and
//! profitability ratios; higher scores mean higher distress risk.

use crate::{
    ConfigurablePredictor, Predictor, PredictorCategory, PredictorConfig, Result, TableInput,
    TableSet,
    lag::{keep_first, lag_name, multi_lag},
    math::{indicator, safe_div, safe_log},
    tables::{PERMNO, TIME_AVAIL_M, Table},
};
use polars::prelude::*;
use tracing::info;

const INPUTS: &[TableInput] = &[TableInput {
    table: Table::AnnualCompustat,
    columns: &[
        PERMNO,
        TIME_AVAIL_M,
        "at",
        "dlc",
        "dltt",
        "act",
        "lct",
        "lt",
        "ni",
        "pi",
    ],
}];

/// Ohlson O-score predictor.
///
/// ```text
/// O = -1.32 - 0.407*SIZE + 6.03*TLTA - 1.43*WCTA + 0.076*CLCA - 1.72*OENEG
///     - 2.37*NITA - 1.83*FUTL + 0.285*INTWO - 0.521*CHIN
/// where:
///   SIZE  = ln(AT)
///   TLTA  = (DLC + DLTT) / AT
///   WCTA  = (ACT - LCT) / AT
///   CLCA  = LCT / ACT
///   OENEG = 1 if LT > AT
///   NITA  = NI / AT
///   FUTL  = PI / LT
///   INTWO = 1 if NI < 0 and NI_{t-12} < 0
///   CHIN  = (NI - NI_{t-12}) / (|NI| + |NI_{t-12}|)
/// ```
///
/// Missing debt items count as zero in TLTA. The two indicators are zero
/// when their inputs are missing.
#[derive(Debug, Clone, Default)]
pub struct OScore {
    config: PredictorConfig,
}

impl Predictor for OScore {
    fn name(&self) -> &str {
        "OScore"
    }

    fn description(&self) -> &str {
        "Ohlson O-score - bankruptcy probability from accounting ratios"
    }

    fn category(&self) -> PredictorCategory {
        PredictorCategory::Distress
    }

    fn inputs(&self) -> &[TableInput] {
        INPUTS
    }

    fn publication_lag(&self) -> u32 {
        self.config.publication_lag
    }

    fn compute_raw(&self, tables: &TableSet) -> Result<DataFrame> {
        let loaded = tables.scan(&INPUTS[0])?.collect()?;
        info!(rows = loaded.height(), "OScore rows loaded");

        let panel = keep_first(loaded.lazy(), PERMNO, TIME_AVAIL_M).collect()?;
        info!(rows = panel.height(), "OScore panel after dedupe on permno-month");
        let ni_lag = col(lag_name("ni", 12).as_str());

        let chin_denominator = col("ni").abs() + ni_lag.clone().abs();
        let result = multi_lag(panel.lazy(), PERMNO, TIME_AVAIL_M, "ni", &[12])?
            .with_columns([
                safe_log(col("at")).alias("size"),
                safe_div(
                    col("dlc").fill_null(lit(0.0)) + col("dltt").fill_null(lit(0.0)),
                    col("at"),
                )
                .alias("tlta"),
                safe_div(col("act") - col("lct"), col("at")).alias("wcta"),
                safe_div(col("lct"), col("act")).alias("clca"),
                indicator(col("lt").gt(col("at"))).alias("oeneg"),
                safe_div(col("ni"), col("at")).alias("nita"),
                safe_div(col("pi"), col("lt")).alias("futl"),
                indicator(col("ni").lt(lit(0.0)).and(ni_lag.clone().lt(lit(0.0))))
                    .alias("intwo"),
                safe_div(col("ni") - ni_lag, chin_denominator).alias("chin"),
            ])
            .select([
                col(PERMNO),
                col(TIME_AVAIL_M),
                (lit(-1.32) - lit(0.407) * col("size") + lit(6.03) * col("tlta")
                    - lit(1.43) * col("wcta")
                    + lit(0.076) * col("clca")
                    - lit(1.72) * col("oeneg")
                    - lit(2.37) * col("nita")
                    - lit(1.83) * col("futl")
                    + lit(0.285) * col("intwo")
                    - lit(0.521) * col("chin"))
                .alias(self.name()),
            ])
            .collect()?;

        info!(
            rows = result.height(),
            computed = result.height() - result.column(self.name())?.null_count(),
            "OScore calculated"
        );
        Ok(result)
    }
}

impl ConfigurablePredictor for OScore {
    fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

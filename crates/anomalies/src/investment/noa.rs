//! Net Operating Assets (NOA) predictor.
//!
//! Hirshleifer, Hou, Teoh and Zhang (2004): firms with large net operating
//! assets relative to their size have accumulated accounting value that
//! outruns cash profitability, and subsequently underperform.

use crate::{
    ConfigurablePredictor, Predictor, PredictorCategory, PredictorConfig, Result, TableInput,
    TableSet,
    lag::{keep_first, lag_name, multi_lag},
    math::safe_div,
    tables::{GVKEY, PERMNO, TIME_AVAIL_M, Table},
};
use polars::prelude::*;
use tracing::info;

const INPUTS: &[TableInput] = &[TableInput {
    table: Table::AnnualCompustat,
    columns: &[
        GVKEY,
        PERMNO,
        TIME_AVAIL_M,
        "at",
        "che",
        "dlc",
        "dltt",
        "mib",
        "ceq",
        "pstk",
    ],
}];

/// Net Operating Assets predictor.
///
/// ```text
/// OA  = AT - CHE
/// OL  = AT - DLC - DLTT - CEQ - MIB - PSTK
/// NOA = (OA - OL) / AT_{t-12}
/// ```
///
/// Minority interest and preferred stock count as zero when missing. The
/// denominator is total assets from the availability month exactly twelve
/// months earlier.
#[derive(Debug, Clone, Default)]
pub struct Noa {
    config: PredictorConfig,
}

impl Predictor for Noa {
    fn name(&self) -> &str {
        "NOA"
    }

    fn description(&self) -> &str {
        "Net operating assets scaled by lagged total assets"
    }

    fn category(&self) -> PredictorCategory {
        PredictorCategory::Investment
    }

    fn inputs(&self) -> &[TableInput] {
        INPUTS
    }

    fn publication_lag(&self) -> u32 {
        self.config.publication_lag
    }

    fn compute_raw(&self, tables: &TableSet) -> Result<DataFrame> {
        let loaded = tables.scan(&INPUTS[0])?.collect()?;
        info!(rows = loaded.height(), "NOA rows loaded");

        let panel = keep_first(loaded.lazy(), PERMNO, TIME_AVAIL_M).collect()?;
        info!(rows = panel.height(), "NOA panel after dedupe on permno-month");

        let at_lag = lag_name("at", 12);
        let result = multi_lag(panel.lazy(), PERMNO, TIME_AVAIL_M, "at", &[12])?
            .with_columns([
                col("mib").fill_null(lit(0.0)),
                col("pstk").fill_null(lit(0.0)),
            ])
            .with_columns([
                (col("at") - col("che")).alias("operating_assets"),
                (col("at")
                    - col("dlc")
                    - col("dltt")
                    - col("ceq")
                    - col("mib")
                    - col("pstk"))
                .alias("operating_liabilities"),
            ])
            .select([
                col(PERMNO),
                col(TIME_AVAIL_M),
                safe_div(
                    col("operating_assets") - col("operating_liabilities"),
                    col(at_lag.as_str()),
                )
                .alias(self.name()),
            ])
            .collect()?;

        info!(
            computed = result.height() - result.column(self.name())?.null_count(),
            "NOA calculated"
        );
        Ok(result)
    }
}

impl ConfigurablePredictor for Noa {
    fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ym(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn panel() -> DataFrame {
        df![
            "gvkey" => [1004i64, 1004, 1004],
            "permno" => [10001i64, 10001, 10001],
            "time_avail_m" => [ym(2022, 1), ym(2023, 1), ym(2023, 1)],
            "at" => [80.0, 100.0, 999.0],
            "che" => [10.0, 20.0, 0.0],
            "dlc" => [5.0, 5.0, 0.0],
            "dltt" => [20.0, 30.0, 0.0],
            "mib" => [None, None, Some(1.0)],
            "ceq" => [40.0, 50.0, 0.0],
            "pstk" => [None, Some(5.0), None]
        ]
        .unwrap()
    }

    #[test]
    fn test_noa_metadata() {
        let predictor = Noa::default();
        assert_eq!(predictor.name(), "NOA");
        assert_eq!(predictor.category(), PredictorCategory::Investment);
        assert_eq!(predictor.publication_lag(), 0);
        assert_eq!(predictor.inputs()[0].columns.len(), 10);
    }

    #[test]
    fn test_noa_computation() {
        let tables = TableSet::new().with_frame(Table::AnnualCompustat, panel());
        let result = Noa::default().compute(&tables).unwrap();

        // Duplicate 2023-01 row is dropped; 2022-01 has no lag.
        // OA = 100 - 20 = 80; OL = 100 - 5 - 30 - 50 - 0 - 5 = 10; NOA = 70 / 80
        assert_eq!(result.height(), 1);
        assert_eq!(
            result.column("yyyymm").unwrap().i64().unwrap().get(0),
            Some(202301)
        );
        let noa = result.column("NOA").unwrap().f64().unwrap();
        assert_relative_eq!(noa.get(0).unwrap(), 70.0 / 80.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noa_zero_lagged_assets_is_missing() {
        let df = df![
            "gvkey" => [1i64, 1],
            "permno" => [1i64, 1],
            "time_avail_m" => [ym(2022, 1), ym(2023, 1)],
            "at" => [0.0, 100.0],
            "che" => [0.0, 20.0],
            "dlc" => [0.0, 5.0],
            "dltt" => [0.0, 30.0],
            "mib" => [0.0, 0.0],
            "ceq" => [0.0, 50.0],
            "pstk" => [0.0, 0.0]
        ]
        .unwrap();

        let tables = TableSet::new().with_frame(Table::AnnualCompustat, df);
        let raw = Noa::default().compute_raw(&tables).unwrap();
        assert_eq!(raw.height(), 2);
        assert_eq!(raw.column("NOA").unwrap().null_count(), 2);
    }
}

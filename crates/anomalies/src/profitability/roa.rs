//! Return on Assets (ROA) predictor.
//!
//! Quarterly income before extraordinary items scaled by the previous
//! quarter's total assets, visible from the first month after the earnings
//! announcement.

use crate::{
    ConfigurablePredictor, Predictor, PredictorCategory, PredictorConfig, Result, TableInput,
    TableSet,
    asof::{AsOfKeys, asof_merge},
    math::safe_div,
    tables::{GVKEY, PERMNO, TIME_AVAIL_M, Table},
};
use polars::prelude::*;
use tracing::info;

const PERIOD_END: &str = "datadateq";
const ANNOUNCED: &str = "rdq";

const INPUTS: &[TableInput] = &[
    TableInput {
        table: Table::SignalMaster,
        columns: &[PERMNO, GVKEY, TIME_AVAIL_M],
    },
    TableInput {
        table: Table::QuarterlyCompustat,
        columns: &[GVKEY, PERIOD_END, ANNOUNCED, "ibq", "atq"],
    },
];

/// Return on Assets predictor.
///
/// ```text
/// ROA_t = IBQ_q / ATQ_{q-1}
/// ```
///
/// where `q` is the latest quarter announced strictly before the start of
/// month `t`. Quarters without an announcement date are taken as announced
/// on their period end. Restated quarters keep the latest announcement, and
/// a non-positive prior-quarter asset base leaves ROA missing.
#[derive(Debug, Clone, Default)]
pub struct Roa {
    config: PredictorConfig,
}

impl Roa {
    /// One row per company quarter with the previous quarter's assets attached.
    fn quarters(&self, tables: &TableSet) -> Result<LazyFrame> {
        let quarters = tables
            .scan(&INPUTS[1])?
            .with_columns([
                col(GVKEY).cast(DataType::Int64),
                col(PERIOD_END).cast(DataType::Date),
                col(ANNOUNCED).cast(DataType::Date),
            ])
            .with_column(col(ANNOUNCED).fill_null(col(PERIOD_END)))
            .filter(col(GVKEY).is_not_null().and(col(PERIOD_END).is_not_null()))
            .sort(
                [GVKEY, PERIOD_END, ANNOUNCED],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .unique_stable(
                Some(vec![GVKEY.into(), PERIOD_END.into()]),
                UniqueKeepStrategy::Last,
            )
            .sort(
                [GVKEY, PERIOD_END],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .with_column(
                col("atq")
                    .shift(lit(1))
                    .over([col(GVKEY)])
                    .alias("atq_prev"),
            )
            .with_column(
                when(col("atq_prev").gt(lit(0.0)))
                    .then(col("atq_prev"))
                    .otherwise(lit(Null {}))
                    .alias("atq_prev"),
            );

        Ok(quarters)
    }
}

impl Predictor for Roa {
    fn name(&self) -> &str {
        "ROA"
    }

    fn description(&self) -> &str {
        "Return on assets - quarterly income over prior-quarter assets, point-in-time"
    }

    fn category(&self) -> PredictorCategory {
        PredictorCategory::Profitability
    }

    fn inputs(&self) -> &[TableInput] {
        INPUTS
    }

    fn publication_lag(&self) -> u32 {
        self.config.publication_lag
    }

    fn compute_raw(&self, tables: &TableSet) -> Result<DataFrame> {
        let months = tables
            .scan(&INPUTS[0])?
            .filter(col(GVKEY).is_not_null())
            .collect()?;
        info!(rows = months.height(), "ROA months loaded with a gvkey");

        let quarters = self
            .quarters(tables)?
            .select([col(GVKEY), col(ANNOUNCED), col(PERIOD_END), col("ibq"), col("atq_prev")])
            .collect()?;
        info!(rows = quarters.height(), "ROA quarters after restatement dedupe");

        let keys = AsOfKeys::new(GVKEY, TIME_AVAIL_M, ANNOUNCED, PERIOD_END);
        let merged = asof_merge(months.lazy(), quarters.lazy(), &keys)?;
        info!(rows = merged.height(), "ROA months after as-of merge");

        let result = merged
            .lazy()
            .select([
                col(PERMNO),
                col(TIME_AVAIL_M),
                safe_div(col("ibq"), col("atq_prev")).alias(self.name()),
            ])
            .collect()?;

        info!(
            computed = result.height() - result.column(self.name())?.null_count(),
            "ROA calculated"
        );
        Ok(result)
    }
}

impl ConfigurablePredictor for Roa {
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

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn tables(quarterly: DataFrame) -> TableSet {
        let months = df![
            "permno" => [10001i64, 10001, 10001, 20002],
            "gvkey" => [Some(1004i64), Some(1004), Some(1004), None],
            "time_avail_m" => [date(2023, 4, 1), date(2023, 5, 1), date(2023, 8, 1), date(2023, 5, 1)]
        ]
        .unwrap();
        TableSet::new()
            .with_frame(Table::SignalMaster, months)
            .with_frame(Table::QuarterlyCompustat, quarterly)
    }

    #[test]
    fn test_roa_metadata() {
        let predictor = Roa::default();
        assert_eq!(predictor.name(), "ROA");
        assert_eq!(predictor.category(), PredictorCategory::Profitability);
        assert_eq!(predictor.inputs().len(), 2);
    }

    #[test]
    fn test_roa_point_in_time() {
        let quarterly = df![
            "gvkey" => [1004i64, 1004, 1004],
            "datadateq" => [date(2022, 12, 31), date(2023, 3, 31), date(2023, 6, 30)],
            "rdq" => [Some(date(2023, 2, 10)), Some(date(2023, 4, 20)), None],
            "ibq" => [5.0, 8.0, 9.0],
            "atq" => [200.0, 250.0, 300.0]
        ]
        .unwrap();

        let result = Roa::default().compute(&tables(quarterly)).unwrap();

        // 2023-04: Q1 announced 04-20 is not yet public; Q4 has no prior quarter.
        // 2023-05: Q1 attached, 8 / 200.
        // 2023-08: Q2 has no rdq, so it counts as announced 06-30; 9 / 250.
        let months: Vec<_> = result
            .column("yyyymm")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(months, vec![202305, 202308]);

        let roa = result.column("ROA").unwrap().f64().unwrap();
        assert_relative_eq!(roa.get(0).unwrap(), 8.0 / 200.0);
        assert_relative_eq!(roa.get(1).unwrap(), 9.0 / 250.0);
    }

    #[test]
    fn test_roa_restatement_keeps_latest_filing() {
        let quarterly = df![
            "gvkey" => [1004i64, 1004, 1004],
            "datadateq" => [date(2022, 12, 31), date(2023, 3, 31), date(2023, 3, 31)],
            "rdq" => [date(2023, 2, 10), date(2023, 4, 25), date(2023, 4, 20)],
            "ibq" => [5.0, 7.0, 6.0],
            "atq" => [200.0, 250.0, 250.0]
        ]
        .unwrap();

        let result = Roa::default().compute(&tables(quarterly)).unwrap();
        let roa = result.column("ROA").unwrap().f64().unwrap();
        assert_relative_eq!(roa.get(0).unwrap(), 7.0 / 200.0);
    }

    #[test]
    fn test_roa_non_positive_prior_assets() {
        let quarterly = df![
            "gvkey" => [1004i64, 1004],
            "datadateq" => [date(2022, 12, 31), date(2023, 3, 31)],
            "rdq" => [date(2023, 2, 10), date(2023, 4, 20)],
            "ibq" => [5.0, 8.0],
            "atq" => [0.0, 250.0]
        ]
        .unwrap();

        let result = Roa::default().compute(&tables(quarterly)).unwrap();
        assert_eq!(result.height(), 0);
    }
}

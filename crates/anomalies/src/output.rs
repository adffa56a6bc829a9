//! Standardized predictor output.
//!
//! Every predictor file has exactly three columns: `permno` (integer),
//! `yyyymm` (integer) and the signal (float), one row per entity-month with
//! a computable signal.

use crate::{
    Result,
    calendar::{MONTH_INDEX, month_index, yyyymm},
    tables::{PERMNO, TIME_AVAIL_M, YYYYMM},
};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Normalize a raw predictor frame into the output layout.
///
/// `raw` must hold `permno`, `time_avail_m` and the `signal` column. The
/// availability month is moved forward by `publication_lag` months before it
/// is encoded as `yyyymm`. Rows with a null or non-finite signal, or a null
/// key, are dropped. The result is sorted by `(permno, yyyymm)`.
pub fn normalize(raw: LazyFrame, signal: &str, publication_lag: u32) -> Result<DataFrame> {
    let result = raw
        .with_column(
            (month_index(col(TIME_AVAIL_M)) + lit(publication_lag as i32)).alias(MONTH_INDEX),
        )
        .filter(
            col(signal)
                .is_not_null()
                .and(col(signal).cast(DataType::Float64).is_finite())
                .and(col(PERMNO).is_not_null())
                .and(col(MONTH_INDEX).is_not_null()),
        )
        .select([
            col(PERMNO).cast(DataType::Int64),
            yyyymm(col(MONTH_INDEX)).alias(YYYYMM),
            col(signal).cast(DataType::Float64),
        ])
        .sort(
            [PERMNO, YYYYMM],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    info!(signal, rows = result.height(), publication_lag, "normalized predictor");
    Ok(result)
}

/// Write `frame` to `<dir>/<signal>.csv`, creating `dir` if needed.
pub fn write_csv(frame: &mut DataFrame, dir: &Path, signal: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{signal}.csv"));

    if frame.height() == 0 {
        warn!(signal, "writing empty predictor file");
    }

    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)?;

    info!(signal, rows = frame.height(), path = %path.display(), "saved predictor");
    Ok(path)
}

//! Point-in-time lags on monthly panels.
//!
//! A lag of `h` months is the value observed for the same entity in the
//! calendar month exactly `h` months earlier. Panels routinely have coverage
//! gaps, so lags are computed by joining on month arithmetic rather than by
//! shifting rows: when the row `h` months back is absent the lag is null,
//! even if some older row exists.

use crate::{
    Result, SignalError,
    calendar::{MONTH_INDEX, month_index},
};
use polars::prelude::*;
use tracing::debug;

/// Column name produced for an `h`-month lag of `target`.
pub fn lag_name(target: &str, horizon: u32) -> String {
    format!("{target}_lag{horizon}")
}

/// Keep the first row, in input order, for each entity and calendar month.
///
/// Dates within the same month count as the same key, matching the
/// uniqueness check in [`multi_lag`].
pub fn keep_first(panel: LazyFrame, entity: &str, month: &str) -> LazyFrame {
    panel
        .with_column(month_index(col(month)).alias(MONTH_INDEX))
        .unique_stable(
            Some(vec![entity.into(), MONTH_INDEX.into()]),
            UniqueKeepStrategy::First,
        )
        .drop([MONTH_INDEX])
}

/// Add `<target>_lag<h>` columns for each horizon in `horizons`.
///
/// The panel must hold at most one row per `(entity, month)`; a panel with
/// duplicate keys is rejected with [`SignalError::DuplicateKeys`]. The
/// utility sorts by `(entity, month)` itself, so callers need not pre-sort.
///
/// Row count is preserved. A lag is null when the entity is null, when no
/// row exists exactly `h` months earlier, or when that row's target is null.
pub fn multi_lag(
    panel: LazyFrame,
    entity: &str,
    month: &str,
    target: &str,
    horizons: &[u32],
) -> Result<LazyFrame> {
    let sorted = panel
        .with_column(month_index(col(month)).alias(MONTH_INDEX))
        .sort(
            [entity, MONTH_INDEX],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    ensure_unique(&sorted, entity, month)?;
    debug!(rows = sorted.height(), target, ?horizons, "computing calendar lags");

    let source = sorted
        .clone()
        .lazy()
        .select([col(entity), col(MONTH_INDEX), col(target)]);

    let mut lagged = sorted.lazy();
    for &horizon in horizons {
        let shifted = source.clone().select([
            col(entity),
            (col(MONTH_INDEX) + lit(horizon as i32)).alias(MONTH_INDEX),
            col(target).alias(lag_name(target, horizon)),
        ]);
        lagged = lagged.join(
            shifted,
            [col(entity), col(MONTH_INDEX)],
            [col(entity), col(MONTH_INDEX)],
            JoinArgs::new(JoinType::Left),
        );
    }

    Ok(lagged
        .sort(
            [entity, MONTH_INDEX],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .drop([MONTH_INDEX]))
}

fn ensure_unique(panel: &DataFrame, entity: &str, month: &str) -> Result<()> {
    let distinct = panel
        .clone()
        .lazy()
        .select([col(entity), col(MONTH_INDEX)])
        .unique(None, UniqueKeepStrategy::Any)
        .collect()?
        .height();

    match panel.height() - distinct {
        0 => Ok(()),
        duplicates => Err(SignalError::DuplicateKeys {
            entity: entity.to_string(),
            month: month.to_string(),
            duplicates,
        }),
    }
}

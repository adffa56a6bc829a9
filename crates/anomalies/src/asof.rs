//! Point-in-time as-of merge of irregular events onto a monthly panel.
//!
//! Each monthly observation receives the most recent event for the same
//! company key that was announced strictly before the first day of the
//! observation's month. An announcement dated on the month start itself is
//! not yet public for that month.

use crate::{
    Result,
    calendar::{epoch_day, month_start_day},
};
use polars::prelude::*;
use tracing::debug;

const BY_KEY: &str = "__asof_key";
const MONTH_START: &str = "__month_start";
const ANNOUNCED_DAY: &str = "__announced_day";

/// Column roles for an as-of merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsOfKeys {
    /// Company key shared by both panels (nullable, integer-like)
    pub by: String,
    /// Availability month of the observation panel
    pub month: String,
    /// Announcement date of each event
    pub announced: String,
    /// Period-end date of each event, used to break announcement ties
    pub period_end: String,
}

impl AsOfKeys {
    /// Create a new set of merge keys.
    pub fn new(
        by: impl Into<String>,
        month: impl Into<String>,
        announced: impl Into<String>,
        period_end: impl Into<String>,
    ) -> Self {
        Self {
            by: by.into(),
            month: month.into(),
            announced: announced.into(),
            period_end: period_end.into(),
        }
    }
}

/// Keep one event per `(by, announced)`: the one with the latest period end.
///
/// Events without a company key or announcement date can never match and
/// are dropped.
pub fn dedupe_events(events: LazyFrame, keys: &AsOfKeys) -> LazyFrame {
    let (by, announced) = (keys.by.as_str(), keys.announced.as_str());
    events
        .filter(col(by).is_not_null().and(col(announced).is_not_null()))
        .sort(
            [by, announced, keys.period_end.as_str()],
            SortMultipleOptions::default()
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .unique_stable(
            Some(vec![by.into(), announced.into()]),
            UniqueKeepStrategy::Last,
        )
}

/// Attach event columns to every observation, backward and non-inclusive.
///
/// The result has one row per observation, sorted by `(by, month)`, with
/// every event column except `by` appended. Observations with a null key or
/// no earlier announcement get nulls. Event column names other than `by`
/// must not already exist in `observations`.
pub fn asof_merge(
    observations: LazyFrame,
    events: LazyFrame,
    keys: &AsOfKeys,
) -> Result<DataFrame> {
    let by = keys.by.as_str();
    let sort_options = SortMultipleOptions::default()
        .with_nulls_last(true)
        .with_maintain_order(true);

    let observations = observations
        .with_columns([
            col(by).cast(DataType::Int64).alias(BY_KEY),
            month_start_day(col(keys.month.as_str())).alias(MONTH_START),
        ])
        .sort([BY_KEY, MONTH_START], sort_options.clone());

    let events = dedupe_events(events.with_column(col(by).cast(DataType::Int64)), keys)
        .with_columns([
            col(by).alias(BY_KEY),
            epoch_day(col(keys.announced.as_str())).alias(ANNOUNCED_DAY),
        ])
        .drop([by])
        .sort([BY_KEY, ANNOUNCED_DAY], sort_options);

    let options = AsOfOptions {
        strategy: AsofStrategy::Backward,
        left_by: Some(vec![BY_KEY.into()]),
        right_by: Some(vec![BY_KEY.into()]),
        allow_eq: false,
        ..Default::default()
    };

    let merged = observations
        .join(
            events,
            [col(MONTH_START)],
            [col(ANNOUNCED_DAY)],
            JoinArgs::new(JoinType::AsOf(options)),
        )
        .collect()?
        .drop_many([BY_KEY, MONTH_START, ANNOUNCED_DAY]);

    debug!(
        rows = merged.height(),
        matched = merged.height() - merged.column(keys.announced.as_str())?.null_count(),
        "as-of merge"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn keys() -> AsOfKeys {
        AsOfKeys::new("gvkey", "time_avail_m", "rdq", "datadateq")
    }

    fn ibq(df: &DataFrame) -> Vec<Option<f64>> {
        df.column("ibq").unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_announcement_on_month_start_is_excluded() {
        let observations = df![
            "permno" => [1i64, 1],
            "gvkey" => [1004i64, 1004],
            "time_avail_m" => [date(2023, 3, 1), date(2023, 4, 1)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => [1004i64, 1004],
            "datadateq" => [date(2022, 12, 31), date(2023, 3, 31)],
            "rdq" => [date(2023, 3, 1), date(2023, 3, 31)],
            "ibq" => [10.0, 20.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();

        assert_eq!(merged.height(), 2);
        assert_eq!(ibq(&merged), vec![None, Some(20.0)]);
    }

    #[test]
    fn test_announcement_one_day_before_is_attached() {
        let observations = df![
            "gvkey" => [1004i64],
            "time_avail_m" => [date(2023, 3, 1)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => [1004i64],
            "datadateq" => [date(2022, 12, 31)],
            "rdq" => [date(2023, 2, 28)],
            "ibq" => [10.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();
        assert_eq!(ibq(&merged), vec![Some(10.0)]);
    }

    #[test]
    fn test_mid_month_announcement_waits_for_next_month() {
        let observations = df![
            "gvkey" => [7i64, 7, 7],
            "time_avail_m" => [date(2023, 3, 1), date(2023, 4, 1), date(2023, 5, 1)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => [7i64],
            "datadateq" => [date(2022, 12, 31)],
            "rdq" => [date(2023, 3, 15)],
            "ibq" => [5.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();
        assert_eq!(ibq(&merged), vec![None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn test_ties_keep_latest_period_end() {
        let observations = df![
            "gvkey" => [7i64],
            "time_avail_m" => [date(2023, 6, 1)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => [7i64, 7],
            "datadateq" => [date(2023, 3, 31), date(2022, 12, 31)],
            "rdq" => [date(2023, 5, 10), date(2023, 5, 10)],
            "ibq" => [2.0, 1.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();
        assert_relative_eq!(ibq(&merged)[0].unwrap(), 2.0);
    }

    #[test]
    fn test_keys_do_not_leak_across_companies() {
        let observations = df![
            "gvkey" => [Some(1i64), Some(2), None],
            "time_avail_m" => [date(2023, 6, 1), date(2023, 6, 1), date(2023, 6, 1)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => [1i64],
            "datadateq" => [date(2023, 3, 31)],
            "rdq" => [date(2023, 4, 20)],
            "ibq" => [3.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();
        assert_eq!(merged.height(), 3);
        assert_eq!(ibq(&merged), vec![Some(3.0), None, None]);
        assert!(merged.column("__asof_key").is_err());
        assert!(merged.column("__month_start").is_err());
        assert!(merged.column("__announced_day").is_err());
    }

    #[test]
    fn test_string_keys_are_normalized() {
        let observations = df![
            "gvkey" => ["001004"],
            "time_avail_m" => [date(2023, 6, 1)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => ["1004"],
            "datadateq" => [date(2023, 3, 31)],
            "rdq" => [date(2023, 4, 20)],
            "ibq" => [3.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();
        assert_eq!(ibq(&merged), vec![Some(3.0)]);
    }

    #[test]
    fn test_mid_month_stamp_uses_month_start() {
        let observations = df![
            "gvkey" => [7i64, 7],
            "time_avail_m" => [date(2023, 4, 20), date(2023, 5, 31)]
        ]
        .unwrap();
        let events = df![
            "gvkey" => [7i64, 7],
            "datadateq" => [date(2022, 12, 31), date(2023, 3, 31)],
            "rdq" => [date(2023, 2, 15), date(2023, 4, 10)],
            "ibq" => [1.0, 2.0]
        ]
        .unwrap();

        let merged = asof_merge(observations.lazy(), events.lazy(), &keys()).unwrap();
        assert_eq!(ibq(&merged), vec![Some(1.0), Some(2.0)]);
    }
}

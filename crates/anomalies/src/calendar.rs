//! Calendar-month arithmetic for availability months.
//!
//! Every monthly panel is keyed by an availability month stored as a
//! first-of-month date. Internally months are compared and shifted through a
//! dense *month index* (`year * 12 + month - 1`), which makes "exactly `h`
//! months earlier" an integer subtraction instead of a row offset.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::fmt;

/// Name of the temporary month-index column added by the lag and merge utilities.
pub(crate) const MONTH_INDEX: &str = "__month_index";

/// A calendar month, stored as its month index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(i32);

impl YearMonth {
    /// Build from a year and a 1-based month. Returns `None` for months outside 1..=12.
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month == 0 || month > 12 {
            return None;
        }
        Some(Self(year * 12 + month as i32 - 1))
    }

    /// Build from a raw month index.
    pub const fn from_index(index: i32) -> Self {
        Self(index)
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year() * 12 + date.month0() as i32)
    }

    /// Raw month index.
    pub const fn index(self) -> i32 {
        self.0
    }

    /// Calendar year.
    pub const fn year(self) -> i32 {
        self.0.div_euclid(12)
    }

    /// Calendar month, 1-based.
    pub const fn month(self) -> u32 {
        self.0.rem_euclid(12) as u32 + 1
    }

    /// Shift by a signed number of months.
    pub const fn add_months(self, months: i32) -> Self {
        Self(self.0 + months)
    }

    /// `year * 100 + month`, the integer key written to predictor files.
    pub const fn yyyymm(self) -> i64 {
        self.year() as i64 * 100 + self.month() as i64
    }

    /// First calendar day of the month.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
    }

    /// Days between the Unix epoch and the first day of the month, matching
    /// the physical representation of a polars `Date`.
    pub fn epoch_day(self) -> Option<i32> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
        let days = self.first_day()?.signed_duration_since(epoch).num_days();
        i32::try_from(days).ok()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Month index of a date or datetime column, as `Int32`.
pub fn month_index(date: Expr) -> Expr {
    let date = date.cast(DataType::Date);
    (date.clone().dt().year() * lit(12) + date.dt().month().cast(DataType::Int32) - lit(1))
        .cast(DataType::Int32)
}

/// `year * 100 + month` for a month-index column, as `Int64`.
pub fn yyyymm(index: Expr) -> Expr {
    let index = index.cast(DataType::Int64);
    (index.clone().floor_div(lit(12)) * lit(100) + index % lit(12) + lit(1))
        .cast(DataType::Int64)
}

/// Days since the Unix epoch of a date or datetime column, as `Int32`.
pub fn epoch_day(date: Expr) -> Expr {
    date.cast(DataType::Date).cast(DataType::Int32)
}

/// Epoch day of the first day of each date's month, as `Int32`.
pub fn month_start_day(date: Expr) -> Expr {
    epoch_day(date.cast(DataType::Date).dt().month_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2023, 1, 202301)]
    #[case(2022, 12, 202212)]
    #[case(1999, 7, 199907)]
    fn test_yyyymm(#[case] year: i32, #[case] month: u32, #[case] expected: i64) {
        let ym = YearMonth::new(year, month).unwrap();
        assert_eq!(ym.yyyymm(), expected);
        assert_eq!(ym.year(), year);
        assert_eq!(ym.month(), month);
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(YearMonth::new(2023, 0).is_none());
        assert!(YearMonth::new(2023, 13).is_none());
    }

    #[test]
    fn test_add_months_crosses_year() {
        let ym = YearMonth::new(2022, 11).unwrap().add_months(4);
        assert_eq!(ym, YearMonth::new(2023, 3).unwrap());
        assert_eq!(ym.add_months(-12).to_string(), "2022-03");
    }

    #[test]
    fn test_epoch_day() {
        assert_eq!(YearMonth::new(1970, 1).unwrap().epoch_day(), Some(0));
        assert_eq!(YearMonth::new(1970, 2).unwrap().epoch_day(), Some(31));
        let march = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
        assert_eq!(
            YearMonth::from_date(march).first_day(),
            NaiveDate::from_ymd_opt(2023, 3, 1)
        );
    }

    #[test]
    fn test_month_index_expressions() {
        let dates = [
            NaiveDate::from_ymd_opt(2022, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        ];
        let df = df!["time_avail_m" => dates].unwrap();

        let result = df
            .lazy()
            .select([
                month_index(col("time_avail_m")).alias("idx"),
                yyyymm(month_index(col("time_avail_m"))).alias("yyyymm"),
                epoch_day(col("time_avail_m")).alias("day"),
            ])
            .collect()
            .unwrap();

        let idx = result.column("idx").unwrap().i32().unwrap();
        assert_eq!(idx.get(0), Some(YearMonth::new(2022, 12).unwrap().index()));
        assert_eq!(idx.get(1).unwrap() - idx.get(0).unwrap(), 1);

        let keys = result.column("yyyymm").unwrap().i64().unwrap();
        assert_eq!(keys.get(0), Some(202212));
        assert_eq!(keys.get(1), Some(202301));

        let days = result.column("day").unwrap().i32().unwrap();
        assert_eq!(days.get(1), YearMonth::new(2023, 1).unwrap().epoch_day());
    }

    #[test]
    fn test_month_start_day_rolls_back() {
        let dates = [
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
        ];
        let df = df!["time_avail_m" => dates].unwrap();

        let result = df
            .lazy()
            .select([month_start_day(col("time_avail_m")).alias("day")])
            .collect()
            .unwrap();

        let days = result.column("day").unwrap().i32().unwrap();
        assert_eq!(days.get(0), YearMonth::new(2023, 3).unwrap().epoch_day());
        assert_eq!(days.get(1), YearMonth::new(2023, 4).unwrap().epoch_day());
    }

    #[test]
    fn test_yyyymm_on_month_index_column() {
        let months = [
            YearMonth::new(2023, 1).unwrap().index(),
            YearMonth::new(1999, 12).unwrap().index(),
        ];
        let df = df!["idx" => months].unwrap();

        let result = df
            .lazy()
            .select([yyyymm(col("idx")).alias("yyyymm")])
            .collect()
            .unwrap();

        let keys: Vec<_> = result
            .column("yyyymm")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(keys, vec![202301, 199912]);
    }
}

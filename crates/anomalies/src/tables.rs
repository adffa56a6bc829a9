//! Intermediate input tables and their loading.
//!
//! Predictors never open files themselves. They ask a [`TableSet`] for the
//! columns they need from a [`Table`], and the set either scans
//! `<dir>/<stem>.parquet` (falling back to `<stem>.csv`) or hands back a
//! frame supplied in memory.

use crate::{Result, SignalError};
use derive_more::Display;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Entity identifier column.
pub const PERMNO: &str = "permno";
/// Secondary (company) identifier column.
pub const GVKEY: &str = "gvkey";
/// Availability month column.
pub const TIME_AVAIL_M: &str = "time_avail_m";
/// Integer year-month column of predictor output.
pub const YYYYMM: &str = "yyyymm";

/// Intermediate tables shared by the predictors.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Monthly security panel: returns, market value, identifiers
    #[display("SignalMasterTable")]
    SignalMaster,
    /// Annual Compustat expanded to the monthly availability panel
    #[display("m_aCompustat")]
    AnnualCompustat,
    /// Quarterly Compustat filings with announcement dates
    #[display("CompustatQuarterly")]
    QuarterlyCompustat,
}

impl Table {
    /// File stem of the table inside the data directory.
    pub const fn stem(&self) -> &'static str {
        match self {
            Self::SignalMaster => "SignalMasterTable",
            Self::AnnualCompustat => "m_aCompustat",
            Self::QuarterlyCompustat => "CompustatQuarterly",
        }
    }
}

/// Columns a predictor reads from one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInput {
    /// Source table
    pub table: Table,
    /// Required columns, in output order
    pub columns: &'static [&'static str],
}

/// Source of input tables, either a data directory or in-memory frames.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    root: Option<PathBuf>,
    frames: HashMap<Table, DataFrame>,
}

impl TableSet {
    /// An empty set with no directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read tables from `root`.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            frames: HashMap::new(),
        }
    }

    /// Serve `table` from memory instead of disk.
    pub fn with_frame(mut self, table: Table, frame: DataFrame) -> Self {
        self.frames.insert(table, frame);
        self
    }

    /// Data directory, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Lazily read the columns of `input`, failing on any missing column.
    pub fn scan(&self, input: &TableInput) -> Result<LazyFrame> {
        let mut frame = match self.frames.get(&input.table) {
            Some(frame) => frame.clone().lazy(),
            None => self.scan_file(input.table)?,
        };

        let schema = frame.collect_schema()?;
        if let Some(missing) = input.columns.iter().find(|c| !schema.contains(**c)) {
            return Err(SignalError::MissingColumn {
                table: input.table.to_string(),
                column: (*missing).to_string(),
            });
        }

        Ok(frame.select(input.columns.iter().map(|c| col(*c)).collect::<Vec<_>>()))
    }

    fn scan_file(&self, table: Table) -> Result<LazyFrame> {
        let Some(root) = self.root.as_deref() else {
            return Err(SignalError::MissingTable {
                table: table.to_string(),
                searched: "no data directory or in-memory frame".to_string(),
            });
        };

        let parquet = root.join(format!("{}.parquet", table.stem()));
        if parquet.is_file() {
            debug!(path = %parquet.display(), "scanning parquet");
            return Ok(LazyFrame::scan_parquet(&parquet, ScanArgsParquet::default())?);
        }

        let csv = root.join(format!("{}.csv", table.stem()));
        if csv.is_file() {
            debug!(path = %csv.display(), "scanning csv");
            return Ok(LazyCsvReader::new(&csv)
                .with_has_header(true)
                .with_try_parse_dates(true)
                .finish()?);
        }

        Err(SignalError::MissingTable {
            table: table.to_string(),
            searched: format!("{} or {}", parquet.display(), csv.display()),
        })
    }
}

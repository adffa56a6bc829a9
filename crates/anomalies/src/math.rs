//! Arithmetic-safety helpers shared by every predictor formula.
//!
//! Undefined arithmetic never raises and never yields an infinity: it
//! resolves to a null, which then propagates through the rest of a formula
//! and drops the row at output time.

use polars::prelude::*;

fn missing() -> Expr {
    lit(Null {}).cast(DataType::Float64)
}

/// `numerator / denominator`, or null when the denominator is null, NaN or zero.
pub fn safe_div(numerator: Expr, denominator: Expr) -> Expr {
    let numerator = numerator.cast(DataType::Float64);
    let denominator = denominator.cast(DataType::Float64);
    let undefined = denominator
        .clone()
        .is_null()
        .or(denominator.clone().is_nan())
        .or(denominator.clone().eq(lit(0.0)));

    when(undefined)
        .then(missing())
        .otherwise(numerator / denominator)
}

/// Natural log, or null when the argument is null, NaN or not strictly positive.
pub fn safe_log(value: Expr) -> Expr {
    let value = value.cast(DataType::Float64);
    // NaN sorts above every number in polars, so `gt(0)` alone would let it through.
    let defined = value
        .clone()
        .is_not_nan()
        .and(value.clone().gt(lit(0.0)));

    when(defined)
        .then(value.log(std::f64::consts::E))
        .otherwise(missing())
}

/// 1.0 where `condition` holds, 0.0 where it fails or is null.
pub fn indicator(condition: Expr) -> Expr {
    condition.fill_null(lit(false)).cast(DataType::Float64)
}

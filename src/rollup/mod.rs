//! Derived read-only views over the historical store.
//!
//! Everything here is a pure function over rows already read from the
//! store; no rollup ever writes.

pub mod matrix;
pub mod pivot;
pub mod trend;

pub use matrix::{
    apply_filters, build_status_matrix, filter_by_status, MatrixFilters, MatrixRow, StatusCell,
    StatusFilter, StatusMatrix,
};
pub use pivot::{build_access_pivot, month_range, AccessPivot, PivotRow};
pub use trend::{count_on_off_by_date, DailyOnOff};

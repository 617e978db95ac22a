//! Window-function paging over arbitrary SQL.
//!
//! Rows are numbered with `ROW_NUMBER() OVER (ORDER BY ..)` and the inclusive
//! range for the requested page is selected. Ordering by a non-unique
//! expression leaves the order of ties to the backend, so rows may move
//! between pages.

use crate::error::{CruditeError, Result};

/// Name of the row-number column added by [`paged_sql`].
pub const ROW_NUMBER_COLUMN: &str = "row_num";

/// Zero-based page of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryPage {
    index: u64,
    size: u64,
}

impl QueryPage {
    /// Fails when `size` is zero or the page's last row number does not fit
    /// in an `i64`, the widest integer every backend binds.
    pub fn new(index: u64, size: u64) -> Result<Self> {
        if size == 0 {
            return Err(CruditeError::configuration("page size must be greater than 0"));
        }
        let last_row = index
            .checked_add(1)
            .and_then(|pages| pages.checked_mul(size))
            .filter(|&row| row <= i64::MAX as u64);
        if last_row.is_none() {
            return Err(CruditeError::configuration(format!(
                "page {index} of size {size} is out of range"
            )));
        }
        Ok(Self { index, size })
    }

    pub const fn index(&self) -> u64 {
        self.index
    }

    pub const fn size(&self) -> u64 {
        self.size
    }

    // Deserialized pages bypass `new`; saturate rather than overflow.

    /// Zero-based offset of the first row, as used by `OFFSET` clauses.
    pub const fn first_result(&self) -> u64 {
        self.index.saturating_mul(self.size)
    }

    /// One-based number of the first row on this page.
    pub const fn first_row(&self) -> u64 {
        self.first_result().saturating_add(1)
    }

    /// One-based number of the last row on this page.
    pub const fn last_row(&self) -> u64 {
        self.index.saturating_add(1).saturating_mul(self.size)
    }
}

/// Wraps `sql` so only the rows of `page` are returned.
pub fn paged_sql(sql: &str, order_by: &str, page: QueryPage) -> String {
    format!(
        "WITH paged_data AS (SELECT ROW_NUMBER() OVER (ORDER BY {order_by}) AS {ROW_NUMBER_COLUMN}, * FROM ({sql}) paged_source) \
         SELECT * FROM paged_data WHERE {ROW_NUMBER_COLUMN} BETWEEN {} AND {}",
        page.first_row(),
        page.last_row()
    )
}

/// Pages `select * from <table> where <fragment>`; a blank fragment matches every row.
pub fn paged_where(table: &str, fragment: &str, order_by: &str, page: QueryPage) -> String {
    let fragment = if fragment.trim().is_empty() { "1=1" } else { fragment };
    paged_sql(&format!("SELECT * FROM {table} WHERE {fragment}"), order_by, page)
}

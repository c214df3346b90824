//! Client-side sorting for one loaded page of rows.
//!
//! The comparator branches on value type the way the tables expect: text
//! columns compare case-insensitively, numeric columns numerically, and rows
//! that do not carry the column at all stay where they are.

use std::cmp::Ordering;

/// A sortable cell value pulled out of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
}

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Which column a table is sorted on, and which way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: impl Into<String>) -> Self {
        SortState {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Header-click behavior: clicking the sorted column flips direction,
    /// clicking a new one selects it ascending.
    pub fn click(&mut self, column: &str) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column.to_string();
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Rows that can hand out cell values by column key.
pub trait SortSource {
    /// Value for a column key, if the row has one.
    fn sort_value(&self, key: &str) -> Option<SortValue>;
}

/// Compares two rows on a column. Mixed types and missing columns compare
/// equal, so the stable sort leaves such rows in their current order.
pub fn compare_rows<T: SortSource>(a: &T, b: &T, column: &str) -> Ordering {
    match (a.sort_value(column), b.sort_value(column)) {
        (Some(SortValue::Text(a)), Some(SortValue::Text(b))) => compare_text(&a, &b),
        (Some(SortValue::Number(a)), Some(SortValue::Number(b))) => a.total_cmp(&b),
        _ => Ordering::Equal,
    }
}

/// Case-insensitive comparison with a case-sensitive tiebreak. Close enough
/// to locale-aware collation for the names and country codes at hand.
fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    if folded == Ordering::Equal { a.cmp(b) } else { folded }
}

/// Sorts a page of rows in place according to the sort state.
pub fn sort_rows<T: SortSource>(rows: &mut [T], sort: &SortState) {
    rows.sort_by(|a, b| {
        let ordering = compare_rows(a, b, &sort.column);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

//! Small helpers shared by the Diesel repositories: offset pagination,
//! `ILIKE` patterns and numeric column conversions.

use diesel::sql_types::{Integer, Jsonb};
use pagination::PageRequest;

diesel::define_sql_function! {
    /// Element count of a JSONB array column.
    fn jsonb_array_length(array: Jsonb) -> Integer;
}

/// Offset and limit of `page` as SQL bind values.
pub(super) fn page_window(page: PageRequest) -> Result<(i64, i64), String> {
    let offset = i64::try_from(page.offset()).map_err(|_| "page offset exceeds i64 range")?;
    Ok((offset, i64::from(page.limit())))
}

/// Row count returned by `COUNT(*)`, which Postgres never reports negative.
pub(super) fn total_from_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Case-insensitive substring pattern with `LIKE` metacharacters escaped.
pub(super) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Convert a non-negative counter column into its domain width.
pub(super) fn to_count(value: i64, column: &str) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("{column} is negative: {value}"))
}

/// Convert a stock column into its domain width.
pub(super) fn to_quantity(value: i32, column: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{column} is negative: {value}"))
}

/// Convert a domain quantity into the `INTEGER` column width.
pub(super) fn from_quantity(value: u32, column: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{column} exceeds the column range: {value}"))
}

//! Listing window from `skip`/`limit` query parameters

use medrec_common::service::{Window, DEFAULT_LIMIT, DEFAULT_SKIP};
use serde::Deserialize;

/// Query parameters for `GET /patients`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Records to skip from the start (default 0)
    pub skip: Option<i64>,

    /// Maximum records to return (default 5)
    pub limit: Option<i64>,
}

/// Turn query parameters into a window, rejecting negative values
///
/// # Examples
/// ```
/// use medrec_pr::pagination::{to_window, ListQuery};
///
/// let w = to_window(&ListQuery { skip: Some(10), limit: None }).unwrap();
/// assert_eq!((w.skip, w.limit), (10, 5));
///
/// assert!(to_window(&ListQuery { skip: Some(-1), limit: None }).is_err());
/// ```
pub fn to_window(query: &ListQuery) -> Result<Window, String> {
    let skip = non_negative("skip", query.skip, DEFAULT_SKIP)?;
    let limit = non_negative("limit", query.limit, DEFAULT_LIMIT)?;
    Ok(Window { skip, limit })
}

fn non_negative(name: &str, value: Option<i64>, default: usize) -> Result<usize, String> {
    match value {
        None => Ok(default),
        Some(v) => usize::try_from(v).map_err(|_| format!("{} must be >= 0, got {}", name, v)),
    }
}

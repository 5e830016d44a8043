//! Pagination window for segment listings.

use std::num::IntErrorKind;

use crate::{errors::AppError, types::SegmentListQuery};

/// Default pagination limit.
pub const DEFAULT_LIMIT: i64 = 10;

/// Default upper bound on `limit`.
pub const DEFAULT_MAX_LIMIT: i64 = 1000;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl Page {
    /// Builds a page from raw query values.
    ///
    /// Missing, empty or non-numeric values take the defaults and a zero limit
    /// means the default limit. Negative values are rejected. `limit` is clamped
    /// to `max_limit`, including values too large for `i64`.
    pub fn from_query(query: &SegmentListQuery, max_limit: i64) -> Result<Self, AppError> {
        let limit = match parse_param("limit", query.limit.as_deref())? {
            None | Some(0) => DEFAULT_LIMIT,
            Some(limit) => limit.min(max_limit),
        };
        let skip = parse_param("skip", query.skip.as_deref())?.unwrap_or(0);
        Ok(Self { limit, skip })
    }
}

fn parse_param(name: &str, raw: Option<&str>) -> Result<Option<i64>, AppError> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    let negative = || {
        AppError::InvalidInput(format!(
            "{name} must be a non-negative integer (got {raw})"
        ))
    };
    match raw.parse::<i64>() {
        Ok(value) if value < 0 => Err(negative()),
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
            IntErrorKind::NegOverflow => Err(negative()),
            _ => Ok(None),
        },
    }
}

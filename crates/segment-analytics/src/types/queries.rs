//! Query parameter types for API endpoints.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Segment listing query parameters.
///
/// Both values are taken as raw text so that unparseable input falls back to
/// the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct SegmentListQuery {
    /// Maximum number of segments to return (default 10)
    pub limit: Option<String>,
    /// Number of segments to skip (default 0)
    pub skip: Option<String>,
}

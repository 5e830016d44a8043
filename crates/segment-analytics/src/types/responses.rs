//! Response envelopes for API endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Gender, GenderBreakdown, Segment, SegmentStatistics};

/// A segment merged with its statistics. Segments without users carry no statistics fields.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentWithStats {
    #[serde(flatten)]
    pub segment: Segment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_income: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_gender: Option<Gender>,
}

impl SegmentWithStats {
    pub fn merge(segment: Segment, statistics: Option<SegmentStatistics>) -> Self {
        match statistics {
            Some(stats) => Self {
                segment,
                user_count: Some(stats.user_count),
                avg_income: stats.avg_income,
                top_gender: Some(stats.top_gender),
            },
            None => Self {
                segment,
                user_count: None,
                avg_income: None,
                top_gender: None,
            },
        }
    }
}

/// `GET /segments` response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentListResponse {
    pub success: bool,
    pub data: Vec<SegmentWithStats>,
    /// Number of segments in the collection, regardless of the page requested.
    pub total_count: i64,
}

/// Single segment response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentResponse {
    pub success: bool,
    pub data: Segment,
}

/// `GET /segments/{id}/gender-data` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenderDataResponse {
    pub success: bool,
    pub data: Vec<GenderBreakdown>,
}

/// Error envelope returned by every endpoint on failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

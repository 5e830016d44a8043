//! Shapes storage results into the JSON envelopes clients receive.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    models::{GenderBreakdown, Segment, SegmentStatistics},
    types::{
        ErrorResponse, GenderDataResponse, SegmentListResponse, SegmentResponse, SegmentWithStats,
    },
};

/// Merges each segment with its statistics, keeping the page order.
pub fn compose_segment_list_response(
    segments: Vec<Segment>,
    mut statistics: HashMap<Uuid, SegmentStatistics>,
    total_count: i64,
) -> SegmentListResponse {
    let data = segments
        .into_iter()
        .map(|segment| {
            let stats = statistics.remove(&segment.id);
            SegmentWithStats::merge(segment, stats)
        })
        .collect();

    SegmentListResponse {
        success: true,
        data,
        total_count,
    }
}

pub fn compose_segment_response(segment: Segment) -> SegmentResponse {
    SegmentResponse {
        success: true,
        data: segment,
    }
}

pub fn compose_gender_response(breakdown: Vec<GenderBreakdown>) -> GenderDataResponse {
    GenderDataResponse {
        success: true,
        data: breakdown,
    }
}

pub fn compose_error_response(message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: message.into(),
    }
}

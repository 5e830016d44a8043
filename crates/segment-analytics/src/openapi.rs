//! OpenAPI document served alongside Swagger UI.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Segment Analytics API",
        version = "0.1.0",
        description = "Segment listings with per-segment user statistics and gender breakdowns."
    ),
    tags(
        (name = "segments", description = "Segments and their user analytics"),
        (name = "health", description = "Liveness probe"),
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::list_segments,
        crate::handlers::get_segment,
        crate::handlers::update_segment,
        crate::handlers::get_segment_gender_data,
    ),
    components(schemas(
        crate::models::Segment,
        crate::models::Gender,
        crate::models::GenderBreakdown,
        crate::types::SegmentWithStats,
        crate::types::SegmentListResponse,
        crate::types::SegmentResponse,
        crate::types::GenderDataResponse,
        crate::types::ErrorResponse,
        crate::types::UpdateSegmentRequest,
    ))
)]
pub struct ApiDoc;

//! Segment listing, lookup and analytics handlers.

use axum::{
    Extension,
    extract::{Path, Query, rejection::JsonRejection},
    response::Json,
};
use uuid::Uuid;

use crate::{
    AppState, aggregation,
    composer::{compose_gender_response, compose_segment_list_response, compose_segment_response},
    errors::{AppError, ContextError, WithContext},
    pagination::Page,
    types::{
        ErrorResponse, GenderDataResponse, SegmentListQuery, SegmentListResponse, SegmentResponse,
        UpdateSegmentRequest,
    },
};

fn parse_segment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput(format!("Invalid segment id: {raw}")))
}

/// List segments, each merged with its user statistics.
#[utoipa::path(
    get,
    path = "/segments",
    tag = "segments",
    params(SegmentListQuery),
    responses(
        (status = 200, description = "Page of segments with statistics", body = SegmentListResponse),
        (status = 400, description = "Invalid pagination parameter", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn list_segments(
    Extension(state): Extension<AppState>,
    Query(query): Query<SegmentListQuery>,
) -> Result<Json<SegmentListResponse>, ContextError> {
    const CONTEXT: &str = "Get Segment List Error";

    let page = Page::from_query(&query, state.max_page_limit).context(CONTEXT)?;
    let (segments, total_count) = state.segments.list_segments(page).await.context(CONTEXT)?;

    let ids: Vec<Uuid> = segments.iter().map(|s| s.id).collect();
    let statistics = aggregation::compute_segment_statistics(state.users.as_ref(), &ids)
        .await
        .context(CONTEXT)?;

    Ok(Json(compose_segment_list_response(
        segments,
        statistics,
        total_count,
    )))
}

/// Get a single segment.
#[utoipa::path(
    get,
    path = "/segments/{id}",
    tag = "segments",
    params(("id" = String, Path, description = "Segment ID")),
    responses(
        (status = 200, description = "Segment", body = SegmentResponse),
        (status = 400, description = "Malformed segment id", body = ErrorResponse),
        (status = 404, description = "Segment not found", body = ErrorResponse)
    )
)]
pub async fn get_segment(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SegmentResponse>, ContextError> {
    const CONTEXT: &str = "Get Segment by id error";

    let id = parse_segment_id(&id).context(CONTEXT)?;
    let segment = state
        .segments
        .get_segment(id)
        .await
        .context(CONTEXT)?
        .ok_or(AppError::SegmentNotFound(id))
        .context(CONTEXT)?;

    Ok(Json(compose_segment_response(segment)))
}

/// Update a segment. Not applied yet: the body is accepted and the stored segment returned as-is.
#[utoipa::path(
    put,
    path = "/segments/{id}",
    tag = "segments",
    params(("id" = String, Path, description = "Segment ID")),
    request_body = UpdateSegmentRequest,
    responses(
        (status = 200, description = "Unchanged segment", body = SegmentResponse),
        (status = 400, description = "Malformed segment id or body", body = ErrorResponse),
        (status = 404, description = "Segment not found", body = ErrorResponse)
    )
)]
pub async fn update_segment(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSegmentRequest>, JsonRejection>,
) -> Result<Json<SegmentResponse>, ContextError> {
    const CONTEXT: &str = "Update Segment by id error";

    let id = parse_segment_id(&id).context(CONTEXT)?;
    let Json(patch) = payload
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
        .context(CONTEXT)?;
    let segment = state
        .segments
        .update_segment(id, &patch)
        .await
        .context(CONTEXT)?
        .ok_or(AppError::SegmentNotFound(id))
        .context(CONTEXT)?;

    tracing::warn!(segment_id = %id, "Segment updates are not implemented; patch ignored");

    Ok(Json(compose_segment_response(segment)))
}

/// Gender distribution of a segment's users.
#[utoipa::path(
    get,
    path = "/segments/{id}/gender-data",
    tag = "segments",
    params(("id" = String, Path, description = "Segment ID")),
    responses(
        (status = 200, description = "Users per gender with percentages", body = GenderDataResponse),
        (status = 400, description = "Malformed segment id", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn get_segment_gender_data(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenderDataResponse>, ContextError> {
    const CONTEXT: &str = "Segment gender data error";

    let id = parse_segment_id(&id).context(CONTEXT)?;
    let breakdown = aggregation::compute_gender_breakdown(state.users.as_ref(), id)
        .await
        .context(CONTEXT)?;

    Ok(Json(compose_gender_response(breakdown)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segment_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_segment_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_segment_id("not-an-id"),
            Err(AppError::InvalidInput(_))
        ));
    }
}

//! Request body types for API endpoints.

use serde::Deserialize;
use utoipa::ToSchema;

/// Segment update request. Accepted but not applied yet.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSegmentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub criteria: Option<serde_json::Value>,
}

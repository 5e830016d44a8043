//! HTTP request handlers.

pub mod health;
pub mod segments;

// Re-export handlers (including utoipa __path types for OpenAPI)
pub use health::{__path_health_check, health_check};
pub use segments::{
    __path_get_segment, __path_get_segment_gender_data, __path_list_segments,
    __path_update_segment, get_segment, get_segment_gender_data, list_segments, update_segment,
};

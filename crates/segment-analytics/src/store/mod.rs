//! Storage seams for segments and users.
//!
//! Handlers only see the two traits below. [`PgStore`] pushes every
//! aggregation down to PostgreSQL; [`MemoryStore`] evaluates the same stages
//! in-process and backs the router tests and database-less development.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    aggregation::{GenderGroupRow, SegmentGroupRow},
    errors::AppError,
    models::Segment,
    pagination::Page,
    types::UpdateSegmentRequest,
};

/// Read and update access to the segments collection.
#[async_trait]
pub trait SegmentRepository: Send + Sync {
    /// One page of segments in insertion order, plus the size of the whole collection.
    async fn list_segments(&self, page: Page) -> Result<(Vec<Segment>, i64), AppError>;

    async fn get_segment(&self, id: Uuid) -> Result<Option<Segment>, AppError>;

    /// Updates are not supported yet: the patch is discarded and the stored
    /// segment is returned unchanged. `None` if the segment does not exist.
    async fn update_segment(
        &self,
        id: Uuid,
        patch: &UpdateSegmentRequest,
    ) -> Result<Option<Segment>, AppError>;
}

/// Grouping queries over the users collection.
#[async_trait]
pub trait UserAggregation: Send + Sync {
    /// One row per requested segment that has at least one member.
    async fn segment_group_rows(&self, segment_ids: &[Uuid])
    -> Result<Vec<SegmentGroupRow>, AppError>;

    /// One row per gender value observed among the segment's members.
    async fn gender_group_rows(&self, segment_id: Uuid) -> Result<Vec<GenderGroupRow>, AppError>;
}

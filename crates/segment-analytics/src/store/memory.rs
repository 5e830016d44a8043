use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::{SegmentRepository, UserAggregation};
use crate::{
    aggregation::{self, GenderGroupRow, SegmentGroupRow},
    errors::AppError,
    models::{Segment, User},
    pagination::Page,
    types::UpdateSegmentRequest,
};

/// In-process store. Vectors keep insertion order, which is the listing order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    segments: RwLock<Vec<Segment>>,
    users: RwLock<Vec<User>>,
    scan_cap: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts both aggregations to the first `cap` users in insertion order.
    pub fn with_scan_cap(mut self, cap: Option<usize>) -> Self {
        self.scan_cap = cap;
        self
    }

    pub fn insert_segment(&self, segment: Segment) {
        self.segments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(segment);
    }

    pub fn insert_user(&self, user: User) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(user);
    }

    fn scanned<'a>(&self, users: &'a [User]) -> &'a [User] {
        match self.scan_cap {
            Some(cap) => &users[..cap.min(users.len())],
            None => users,
        }
    }
}

#[async_trait]
impl SegmentRepository for MemoryStore {
    async fn list_segments(&self, page: Page) -> Result<(Vec<Segment>, i64), AppError> {
        let segments = self.segments.read().unwrap_or_else(PoisonError::into_inner);
        let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let window = segments.iter().skip(skip).take(limit).cloned().collect();
        Ok((window, segments.len() as i64))
    }

    async fn get_segment(&self, id: Uuid) -> Result<Option<Segment>, AppError> {
        let segments = self.segments.read().unwrap_or_else(PoisonError::into_inner);
        Ok(segments.iter().find(|s| s.id == id).cloned())
    }

    async fn update_segment(
        &self,
        id: Uuid,
        _patch: &UpdateSegmentRequest,
    ) -> Result<Option<Segment>, AppError> {
        self.get_segment(id).await
    }
}

#[async_trait]
impl UserAggregation for MemoryStore {
    async fn segment_group_rows(
        &self,
        segment_ids: &[Uuid],
    ) -> Result<Vec<SegmentGroupRow>, AppError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(aggregation::fold_segment_rows(
            self.scanned(&users),
            segment_ids,
        ))
    }

    async fn gender_group_rows(&self, segment_id: Uuid) -> Result<Vec<GenderGroupRow>, AppError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(aggregation::fold_gender_rows(
            self.scanned(&users),
            segment_id,
        ))
    }
}

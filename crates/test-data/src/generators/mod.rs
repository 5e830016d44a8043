//! Entity generators for test data.
//!
//! - [`SegmentGenerator`]: segments with names and membership criteria
//! - [`UserGenerator`]: users with gender, income and segment memberships

pub mod segment;
pub mod user;

use rand::Rng;
use uuid::{Builder, Uuid};

/// A v4 UUID drawn from `rng`, so seeded generators reproduce their ids.
pub fn random_uuid(rng: &mut impl Rng) -> Uuid {
    Builder::from_random_bytes(rng.r#gen()).into_uuid()
}

pub use segment::SegmentGenerator;
pub use user::{UserGenConfig, UserGenerator};

//! Test data generation for segment-analytics.
//!
//! Generates segments and users whose gender mix, income reporting and
//! segment memberships resemble production data, and inserts them into
//! PostgreSQL so the aggregation queries can be exercised at scale.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let config = SeedConfig { user_count: 250_000, ..SeedConfig::default() };
//! let mut rng = StdRng::seed_from_u64(config.seed);
//! let segments = SegmentGenerator::new().generate_batch(config.segment_count, &mut rng);
//! let users = UserGenerator::new().generate_batch(config.user_count, &segments, &mut rng);
//! Seeder::new(pool).with_batch_size(config.batch_size).seed(&segments, &users).await?;
//! ```

pub mod config;
pub mod db;
pub mod generators;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{GenderMix, IncomeProfile, SeedConfig};
    pub use crate::db::Seeder;
    pub use crate::generators::{SegmentGenerator, UserGenerator};
    pub use rand::{SeedableRng, rngs::StdRng};
    pub use segment_analytics::models::{Segment, User};
}

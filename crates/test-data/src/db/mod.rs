//! Database integration for seeding test data.
//!
//! The [`Seeder`] inserts generated segments and users in batches, one
//! transaction per batch.

mod seeder;

pub use seeder::{SeedError, Seeder};

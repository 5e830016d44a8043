//! Configuration types for test data generation.

use serde::{Deserialize, Serialize};

/// Relative weights of stored gender values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenderMix {
    pub male: f64,
    pub female: f64,
    pub other: f64,
    /// Users stored with a value outside the ranked categories.
    pub unranked: f64,
    /// Users stored without any gender.
    pub missing: f64,
}

impl Default for GenderMix {
    fn default() -> Self {
        Self {
            male: 0.47,
            female: 0.45,
            other: 0.03,
            unranked: 0.03,
            missing: 0.02,
        }
    }
}

/// Shape of generated incomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncomeProfile {
    /// Median monthly income.
    pub monthly_median: f64,
    /// Spread of the log-normal income distribution.
    pub sigma: f64,
    /// Probability that a user reports a yearly figure.
    pub yearly_share: f64,
    /// Probability that a user reports no income at all.
    pub missing_share: f64,
}

impl Default for IncomeProfile {
    fn default() -> Self {
        Self {
            monthly_median: 3500.0,
            sigma: 0.6,
            yearly_share: 0.4,
            missing_share: 0.05,
        }
    }
}

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Number of segments to generate.
    pub segment_count: usize,

    /// Number of users to generate.
    pub user_count: usize,

    /// Segment memberships per user (inclusive range).
    pub memberships_per_user: (usize, usize),

    pub gender_mix: GenderMix,

    pub income: IncomeProfile,

    /// Batch size for database insertions.
    pub batch_size: usize,

    /// RNG seed for reproducible data.
    pub seed: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            segment_count: 25,
            user_count: 10_000,
            memberships_per_user: (0, 4),
            gender_mix: GenderMix::default(),
            income: IncomeProfile::default(),
            batch_size: 500,
            seed: 12345,
        }
    }
}

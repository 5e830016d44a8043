//! Segment generation.

use fake::{Fake, faker::company::en::Buzzword};
use rand::Rng;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use segment_analytics::models::Segment;

use super::random_uuid;

const REGIONS: [&str; 6] = ["US-West", "US-East", "EU", "UK", "APAC", "LATAM"];

/// Generates segments with increasing creation times, so listing order
/// matches generation order.
pub struct SegmentGenerator {
    epoch: OffsetDateTime,
}

impl SegmentGenerator {
    pub fn new() -> Self {
        Self {
            epoch: OffsetDateTime::now_utc() - Duration::days(30),
        }
    }

    /// Generates the `index`-th segment.
    pub fn generate(&self, index: usize, rng: &mut impl Rng) -> Segment {
        let buzzword: String = Buzzword().fake_with_rng(rng);
        let min_age: u32 = rng.gen_range(18..50);
        let max_age = min_age + rng.gen_range(5..30);
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];

        Segment {
            id: random_uuid(rng),
            name: format!("{buzzword} audience {}", index + 1),
            description: rng
                .gen_bool(0.5)
                .then(|| format!("Users aged {min_age}-{max_age} in {region}")),
            criteria: json!({
                "ageRange": [min_age, max_age],
                "regions": [region],
            }),
            created_at: self.epoch + Duration::minutes(index as i64),
        }
    }

    /// Generates multiple segments.
    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<Segment> {
        (0..count).map(|i| self.generate(i, rng)).collect()
    }
}

impl Default for SegmentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

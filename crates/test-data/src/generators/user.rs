//! User generation with gender, income and segment memberships.

use fake::{Fake, faker::name::en::Name};
use rand::{Rng, seq::index};
use rand_distr::{Distribution, LogNormal};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::random_uuid;

use segment_analytics::models::{Gender, Segment, User, YEARLY_INCOME_TYPE};

use crate::config::{GenderMix, IncomeProfile, SeedConfig};

/// Stored gender value outside the ranked categories.
const UNRANKED_GENDER: &str = "Prefer not to say";

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    pub gender_mix: GenderMix,
    pub income: IncomeProfile,
    /// Segment memberships per user (inclusive range).
    pub memberships: (usize, usize),
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            gender_mix: GenderMix::default(),
            income: IncomeProfile::default(),
            memberships: (0, 4),
        }
    }
}

impl From<&SeedConfig> for UserGenConfig {
    fn from(config: &SeedConfig) -> Self {
        Self {
            gender_mix: config.gender_mix,
            income: config.income,
            memberships: config.memberships_per_user,
        }
    }
}

/// Generates realistic user data for testing.
pub struct UserGenerator {
    config: UserGenConfig,
    epoch: OffsetDateTime,
}

impl UserGenerator {
    /// Creates a new user generator with default configuration.
    pub fn new() -> Self {
        Self::with_config(UserGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: UserGenConfig) -> Self {
        Self {
            config,
            epoch: OffsetDateTime::now_utc() - Duration::days(30),
        }
    }

    /// Generates the `index`-th user, joining some of `segments`.
    pub fn generate(&self, index: usize, segments: &[Segment], rng: &mut impl Rng) -> User {
        let name: String = Name().fake_with_rng(rng);
        let (income_level, income_type) = self.generate_income(rng);

        User {
            id: random_uuid(rng),
            name,
            gender: self.generate_gender(rng),
            income_level,
            income_type,
            segment_ids: self.generate_memberships(segments, rng),
            created_at: self.epoch + Duration::milliseconds(index as i64),
        }
    }

    /// Generates multiple users.
    pub fn generate_batch(
        &self,
        count: usize,
        segments: &[Segment],
        rng: &mut impl Rng,
    ) -> Vec<User> {
        (0..count)
            .map(|i| self.generate(i, segments, rng))
            .collect()
    }

    /// Picks a stored gender value based on the configured mix.
    fn generate_gender(&self, rng: &mut impl Rng) -> Option<String> {
        let mix = &self.config.gender_mix;
        let total = mix.male + mix.female + mix.other + mix.unranked + mix.missing;
        let roll = rng.r#gen::<f64>() * total;

        let ranked = [
            (mix.male, Gender::Male),
            (mix.female, Gender::Female),
            (mix.other, Gender::Other),
        ];
        let mut cumulative = 0.0;
        for (weight, gender) in ranked {
            cumulative += weight;
            if roll < cumulative {
                return Some(gender.as_str().to_string());
            }
        }

        cumulative += mix.unranked;
        (roll < cumulative).then(|| UNRANKED_GENDER.to_string())
    }

    /// Draws a monthly income and reports it either monthly or yearly.
    fn generate_income(&self, rng: &mut impl Rng) -> (Option<f64>, Option<String>) {
        let profile = &self.config.income;
        if rng.gen_bool(profile.missing_share.clamp(0.0, 1.0)) {
            return (None, None);
        }

        let monthly = match LogNormal::new(profile.monthly_median.ln(), profile.sigma) {
            Ok(dist) => dist.sample(rng),
            Err(_) => profile.monthly_median,
        };
        let monthly = (monthly * 100.0).round() / 100.0;

        if rng.gen_bool(profile.yearly_share.clamp(0.0, 1.0)) {
            (Some(monthly * 12.0), Some(YEARLY_INCOME_TYPE.to_string()))
        } else {
            (Some(monthly), Some("monthly".to_string()))
        }
    }

    /// Picks distinct segments for one user.
    fn generate_memberships(&self, segments: &[Segment], rng: &mut impl Rng) -> Vec<Uuid> {
        let (min, max) = self.config.memberships;
        let max = max.min(segments.len());
        let min = min.min(max);
        let count = rng.gen_range(min..=max);

        index::sample(rng, segments.len(), count)
            .into_iter()
            .map(|i| segments[i].id)
            .collect()
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::SegmentGenerator;

    #[test]
    fn test_generate_batch() {
        let mut rng = rand::thread_rng();
        let segments = SegmentGenerator::new().generate_batch(5, &mut rng);
        let users = UserGenerator::new().generate_batch(50, &segments, &mut rng);

        assert_eq!(users.len(), 50);
        let ids: std::collections::HashSet<_> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 50);

        let known: std::collections::HashSet<_> = segments.iter().map(|s| s.id).collect();
        for user in &users {
            assert!(user.segment_ids.len() <= 4);
            assert!(user.segment_ids.iter().all(|id| known.contains(id)));
            let distinct: std::collections::HashSet<_> = user.segment_ids.iter().collect();
            assert_eq!(distinct.len(), user.segment_ids.len());
        }
    }

    #[test]
    fn test_seeded_rng_reproduces_users() {
        use rand::{SeedableRng, rngs::StdRng};

        let mut rng = StdRng::seed_from_u64(12345);
        let segments = SegmentGenerator::new().generate_batch(3, &mut rng);
        let user_gen = UserGenerator::new();
        let first = user_gen.generate_batch(20, &segments, &mut StdRng::seed_from_u64(1));
        let second = user_gen.generate_batch(20, &segments, &mut StdRng::seed_from_u64(1));

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.segment_ids, b.segment_ids);
            assert_eq!(a.gender, b.gender);
            assert_eq!(a.income_level, b.income_level);
        }
    }

    #[test]
    fn test_yearly_income_is_twelve_months() {
        let config = UserGenConfig {
            income: IncomeProfile {
                yearly_share: 1.0,
                missing_share: 0.0,
                ..IncomeProfile::default()
            },
            ..UserGenConfig::default()
        };
        let mut rng = rand::thread_rng();
        let user = UserGenerator::with_config(config).generate(0, &[], &mut rng);

        assert_eq!(user.income_type.as_deref(), Some(YEARLY_INCOME_TYPE));
        assert!(user.income_level.unwrap() > 0.0);
        assert!(user.segment_ids.is_empty());
    }

    #[test]
    fn test_gender_mix_only_males() {
        let config = UserGenConfig {
            gender_mix: GenderMix {
                male: 1.0,
                female: 0.0,
                other: 0.0,
                unranked: 0.0,
                missing: 0.0,
            },
            ..UserGenConfig::default()
        };
        let user_gen = UserGenerator::with_config(config);
        let mut rng = rand::thread_rng();
        for i in 0..20 {
            let user = user_gen.generate(i, &[], &mut rng);
            assert_eq!(user.gender.as_deref(), Some("Male"));
        }
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// A named grouping of users. Everything besides the id is opaque to the analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Free-form membership criteria as authored by the segment owner.
    #[schema(value_type = Object)]
    pub criteria: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            criteria: serde_json::Value::Object(Default::default()),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A user record as stored in the `users` table.
///
/// `segment_ids` is many-to-many: a user may belong to any number of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub gender: Option<String>,
    pub income_level: Option<f64>,
    pub income_type: Option<String>,
    pub segment_ids: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn new(name: impl Into<String>, segment_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            gender: None,
            income_level: None,
            income_type: None,
            segment_ids,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_income(mut self, level: f64, income_type: impl Into<String>) -> Self {
        self.income_level = Some(level);
        self.income_type = Some(income_type.into());
        self
    }
}

/// The gender categories ranked when picking a segment's top gender.
///
/// Stored values are matched exactly against [`Gender::as_str`]; anything else
/// (including a missing gender) is counted towards the segment total only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Scan order for the top-gender reduction. Earlier entries win ties.
    pub const PRECEDENCE: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        Self::PRECEDENCE.into_iter().find(|g| g.as_str() == value)
    }
}

/// Income type value marking an annual figure. Every other value is monthly.
pub const YEARLY_INCOME_TYPE: &str = "yearly";

/// Per-segment statistics derived from the users collection at query time.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStatistics {
    pub segment_id: Uuid,
    pub user_count: i64,
    /// Mean normalized monthly income, rounded. `None` when no user reports an income.
    pub avg_income: Option<i64>,
    /// Most frequent ranked category. Ties, including all-zero counts, go to
    /// the earliest entry of [`Gender::PRECEDENCE`].
    pub top_gender: Gender,
}

/// One row of a segment's gender distribution.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenderBreakdown {
    /// The stored gender value; `null` groups users without one.
    pub gender: Option<String>,
    pub user_count: i64,
    pub user_percentage: i64,
}

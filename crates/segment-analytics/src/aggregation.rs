//! Segment and gender statistics over the users collection.
//!
//! The grouping itself runs inside the storage backend (see
//! [`UserAggregation`]); this module owns the arithmetic applied to the
//! grouped rows and the in-process fold used by backends without a query
//! engine of their own.

use std::collections::{HashMap, HashSet};

use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Gender, GenderBreakdown, SegmentStatistics, User, YEARLY_INCOME_TYPE},
    store::UserAggregation,
};

/// One grouped row per segment, as produced by the segment statistics query.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SegmentGroupRow {
    pub segment_id: Uuid,
    pub user_count: i64,
    pub avg_income: Option<f64>,
    pub male_count: i64,
    pub female_count: i64,
    pub other_count: i64,
}

/// One grouped row per observed gender value within a segment.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct GenderGroupRow {
    pub gender: Option<String>,
    pub user_count: i64,
}

/// Converts a reported income to a monthly figure.
pub fn monthly_income(income_level: f64, income_type: Option<&str>) -> f64 {
    if income_type == Some(YEARLY_INCOME_TYPE) {
        income_level / 12.0
    } else {
        income_level
    }
}

/// Rounds to the nearest integer, with halves going up.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Counts of users per ranked gender category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderTally {
    pub male: i64,
    pub female: i64,
    pub other: i64,
}

impl GenderTally {
    pub fn count(&self, gender: Gender) -> i64 {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
            Gender::Other => self.other,
        }
    }

    /// Counts one user. Values outside the ranked categories are ignored.
    pub fn record(&mut self, stored: Option<&str>) {
        match stored.and_then(Gender::from_stored) {
            Some(Gender::Male) => self.male += 1,
            Some(Gender::Female) => self.female += 1,
            Some(Gender::Other) => self.other += 1,
            None => {}
        }
    }

    /// Pairwise max over [`Gender::PRECEDENCE`]: a later category replaces the
    /// running best only with a strictly greater count, so all-zero counts
    /// yield the first category.
    pub fn top_gender(&self) -> Gender {
        let [first, rest @ ..] = Gender::PRECEDENCE;
        let mut best = (first, self.count(first));
        for gender in rest {
            let count = self.count(gender);
            if count > best.1 {
                best = (gender, count);
            }
        }
        best.0
    }
}

impl From<&SegmentGroupRow> for SegmentStatistics {
    fn from(row: &SegmentGroupRow) -> Self {
        let tally = GenderTally {
            male: row.male_count,
            female: row.female_count,
            other: row.other_count,
        };
        Self {
            segment_id: row.segment_id,
            user_count: row.user_count,
            avg_income: row.avg_income.map(round_half_up),
            top_gender: tally.top_gender(),
        }
    }
}

/// Share of `total` taken by `count`, as a rounded whole percentage.
pub fn user_percentage(count: i64, total: i64) -> Result<i64, AppError> {
    if total == 0 {
        return Err(AppError::DivisionUndefined);
    }
    Ok(round_half_up(count as f64 / total as f64 * 100.0))
}

/// Attaches percentages to grouped gender rows. No rows yields no breakdown.
pub fn breakdown_from_rows(rows: Vec<GenderGroupRow>) -> Result<Vec<GenderBreakdown>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let total: i64 = rows.iter().map(|r| r.user_count).sum();
    rows.into_iter()
        .map(|row| {
            Ok(GenderBreakdown {
                user_percentage: user_percentage(row.user_count, total)?,
                gender: row.gender,
                user_count: row.user_count,
            })
        })
        .collect()
}

/// Statistics for every requested segment that has at least one user.
///
/// Segments without users are absent from the map.
pub async fn compute_segment_statistics(
    users: &dyn UserAggregation,
    segment_ids: &[Uuid],
) -> Result<HashMap<Uuid, SegmentStatistics>, AppError> {
    if segment_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users.segment_group_rows(segment_ids).await?;
    tracing::debug!(
        segments = segment_ids.len(),
        groups = rows.len(),
        "Computed segment statistics"
    );
    Ok(rows
        .iter()
        .map(|row| (row.segment_id, SegmentStatistics::from(row)))
        .collect())
}

/// Gender distribution of one segment's users, largest group first.
pub async fn compute_gender_breakdown(
    users: &dyn UserAggregation,
    segment_id: Uuid,
) -> Result<Vec<GenderBreakdown>, AppError> {
    let rows = users.gender_group_rows(segment_id).await?;
    breakdown_from_rows(rows)
}

/// In-process equivalent of the segment statistics query.
///
/// Users are matched on any overlap with `segment_ids`, expanded to one entry
/// per membership, and only memberships in `segment_ids` are grouped.
pub fn fold_segment_rows<'a>(
    users: impl IntoIterator<Item = &'a User>,
    segment_ids: &[Uuid],
) -> Vec<SegmentGroupRow> {
    #[derive(Default)]
    struct Acc {
        user_count: i64,
        income_sum: f64,
        income_count: i64,
        tally: GenderTally,
    }

    let wanted: HashSet<Uuid> = segment_ids.iter().copied().collect();
    let mut groups: HashMap<Uuid, Acc> = HashMap::new();

    for user in users {
        if !user.segment_ids.iter().any(|id| wanted.contains(id)) {
            continue;
        }
        let income = user
            .income_level
            .map(|level| monthly_income(level, user.income_type.as_deref()));

        for segment_id in user.segment_ids.iter().filter(|id| wanted.contains(id)) {
            let acc = groups.entry(*segment_id).or_default();
            acc.user_count += 1;
            if let Some(income) = income {
                acc.income_sum += income;
                acc.income_count += 1;
            }
            acc.tally.record(user.gender.as_deref());
        }
    }

    groups
        .into_iter()
        .map(|(segment_id, acc)| SegmentGroupRow {
            segment_id,
            user_count: acc.user_count,
            avg_income: (acc.income_count > 0).then(|| acc.income_sum / acc.income_count as f64),
            male_count: acc.tally.male,
            female_count: acc.tally.female,
            other_count: acc.tally.other,
        })
        .collect()
}

/// In-process equivalent of the gender breakdown query, ordered by count
/// descending then gender ascending with missing genders last.
pub fn fold_gender_rows<'a>(
    users: impl IntoIterator<Item = &'a User>,
    segment_id: Uuid,
) -> Vec<GenderGroupRow> {
    let mut counts: HashMap<Option<String>, i64> = HashMap::new();
    for user in users {
        if user.segment_ids.contains(&segment_id) {
            *counts.entry(user.gender.clone()).or_default() += 1;
        }
    }

    let mut rows: Vec<GenderGroupRow> = counts
        .into_iter()
        .map(|(gender, user_count)| GenderGroupRow { gender, user_count })
        .collect();
    rows.sort_by(|a, b| {
        b.user_count
            .cmp(&a.user_count)
            .then_with(|| match (&a.gender, &b.gender) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });
    rows
}

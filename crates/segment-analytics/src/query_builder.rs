//! SQL builders for the analytics queries.
//!
//! Each aggregation is a fixed chain of stages rendered as CTEs, every stage
//! reading from the one before it. [`QueryBuilder`] tracks WHERE conditions
//! and bind parameter indices so placeholders stay in step with the binds
//! issued by the store.

use crate::models::{Gender, YEARLY_INCOME_TYPE};

/// Column names shared between the rendered SQL and the row types.
pub mod columns {
    pub const SEGMENT_IDS: &str = "segment_ids";
    pub const GENDER: &str = "gender";
    pub const INCOME_LEVEL: &str = "income_level";
    pub const INCOME_TYPE: &str = "income_type";
    /// Identity column recording insertion order.
    pub const SEQ: &str = "seq";

    pub const MONTHLY_INCOME: &str = "monthly_income";
    pub const SEGMENT_ID: &str = "segment_id";
    pub const USER_COUNT: &str = "user_count";
    pub const AVG_INCOME: &str = "avg_income";
}

/// Builder for SQL WHERE clauses with parameter tracking.
#[derive(Debug)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    param_idx: usize,
}

impl QueryBuilder {
    /// Creates a builder whose first placeholder is `$1`.
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            param_idx: 1,
        }
    }

    /// Adds a static condition (no parameter binding).
    pub fn add_condition(&mut self, condition: impl Into<String>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    /// Increments and returns the next parameter index.
    pub fn next_param_idx(&mut self) -> usize {
        let idx = self.param_idx;
        self.param_idx += 1;
        idx
    }

    /// Builds the full WHERE clause including the "WHERE" keyword.
    /// Returns an empty string if no conditions were added.
    pub fn build_where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// An ordered chain of named CTE stages followed by a final SELECT.
#[derive(Debug, Default)]
struct StagedQuery {
    stages: Vec<(&'static str, String)>,
}

impl StagedQuery {
    fn stage(mut self, name: &'static str, body: String) -> Self {
        self.stages.push((name, body));
        self
    }

    /// Name of the most recently added stage, i.e. the input of the next one.
    fn last(&self) -> &'static str {
        self.stages.last().map_or("users", |(name, _)| *name)
    }

    fn finish(self, select: String) -> String {
        let ctes: Vec<String> = self
            .stages
            .into_iter()
            .map(|(name, body)| format!("{name} AS ({body})"))
            .collect();
        format!("WITH {} {select}", ctes.join(", "))
    }
}

/// Scan stage over `users`, optionally restricted to the first `cap` rows in
/// insertion order. Binds the cap when present.
fn scan_stage(qb: &mut QueryBuilder, scan_cap: Option<i64>, projection: &[&str]) -> String {
    use columns::SEQ;

    let projection = projection.join(", ");
    match scan_cap {
        Some(_) => {
            let idx = qb.next_param_idx();
            format!("SELECT {projection} FROM users ORDER BY {SEQ} LIMIT ${idx}")
        }
        None => format!("SELECT {projection} FROM users"),
    }
}

/// Per-segment statistics: `$1` is the requested segment ids (`uuid[]`),
/// `$2` the scan cap when one is configured.
#[derive(Debug, Clone, Copy)]
pub struct SegmentStatsQuery {
    pub scan_cap: Option<i64>,
}

impl SegmentStatsQuery {
    pub fn new(scan_cap: Option<i64>) -> Self {
        Self { scan_cap }
    }

    pub fn sql(&self) -> String {
        use columns::*;

        let mut params = QueryBuilder::new();
        let ids = params.next_param_idx();
        let scan = scan_stage(
            &mut params,
            self.scan_cap,
            &[SEGMENT_IDS, GENDER, INCOME_LEVEL, INCOME_TYPE],
        );
        let query = StagedQuery::default().stage("scanned", scan);

        let mut overlap = QueryBuilder::new();
        overlap.add_condition(format!("{SEGMENT_IDS} && ${ids}::uuid[]"));
        let matched = format!(
            "SELECT {SEGMENT_IDS}, {GENDER}, \
             CASE WHEN {INCOME_TYPE} = '{YEARLY_INCOME_TYPE}' \
             THEN {INCOME_LEVEL} / 12.0 ELSE {INCOME_LEVEL} END AS {MONTHLY_INCOME} \
             FROM {} {}",
            query.last(),
            overlap.build_where_clause()
        );
        let query = query.stage("matched", matched);

        let unwound = format!(
            "SELECT unnest({SEGMENT_IDS}) AS {SEGMENT_ID}, {GENDER}, {MONTHLY_INCOME} FROM {}",
            query.last()
        );
        let query = query.stage("unwound", unwound);

        let mut member = QueryBuilder::new();
        member.add_condition(format!("{SEGMENT_ID} = ANY(${ids}::uuid[])"));
        let gender_counts: Vec<String> = Gender::PRECEDENCE
            .iter()
            .map(|g| {
                format!(
                    "COUNT(*) FILTER (WHERE {GENDER} = '{}') AS {}",
                    g.as_str(),
                    gender_count_column(*g)
                )
            })
            .collect();
        let select = format!(
            "SELECT {SEGMENT_ID}, COUNT(*) AS {USER_COUNT}, AVG({MONTHLY_INCOME}) AS {AVG_INCOME}, {} \
             FROM {} {} GROUP BY {SEGMENT_ID}",
            gender_counts.join(", "),
            query.last(),
            member.build_where_clause()
        );

        query.finish(select)
    }
}

/// Output column holding the count for one ranked gender.
pub fn gender_count_column(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male_count",
        Gender::Female => "female_count",
        Gender::Other => "other_count",
    }
}

/// Gender distribution for one segment: `$1` is the segment id, `$2` the scan
/// cap when one is configured.
#[derive(Debug, Clone, Copy)]
pub struct GenderBreakdownQuery {
    pub scan_cap: Option<i64>,
}

impl GenderBreakdownQuery {
    pub fn new(scan_cap: Option<i64>) -> Self {
        Self { scan_cap }
    }

    pub fn sql(&self) -> String {
        use columns::*;

        let mut params = QueryBuilder::new();
        let id = params.next_param_idx();
        let scan = scan_stage(&mut params, self.scan_cap, &[SEGMENT_IDS, GENDER]);
        let query = StagedQuery::default().stage("scanned", scan);

        let mut member = QueryBuilder::new();
        member.add_condition(format!("{SEGMENT_IDS} @> ARRAY[${id}::uuid]"));
        let matched = format!(
            "SELECT {GENDER} FROM {} {}",
            query.last(),
            member.build_where_clause()
        );
        let query = query.stage("matched", matched);

        let select = format!(
            "SELECT {GENDER}, COUNT(*) AS {USER_COUNT} FROM {} GROUP BY {GENDER} \
             ORDER BY {USER_COUNT} DESC, {GENDER} COLLATE \"C\" ASC NULLS LAST",
            query.last()
        );

        query.finish(select)
    }
}

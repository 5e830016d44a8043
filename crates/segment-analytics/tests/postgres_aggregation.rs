//! Integration tests for the PostgreSQL-backed aggregations.
//!
//! To run these tests, you need:
//! 1. A PostgreSQL database with migrations applied
//! 2. DATABASE_URL environment variable set
//!
//! Run with: `DATABASE_URL=postgres://... cargo test -p segment-analytics --test postgres_aggregation`
//!
//! Every test works on freshly generated segment ids and removes its rows
//! afterwards, so a development database is safe to use. Tests hold
//! [`DB_LOCK`] because window and scan-cap assertions depend on row counts.

use std::{collections::HashMap, env};

use segment_analytics::{
    aggregation::{compute_gender_breakdown, compute_segment_statistics},
    models::{Gender, Segment, User},
    pagination::Page,
    store::{PgStore, SegmentRepository},
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::Mutex;
use uuid::Uuid;

static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// Get database pool, skipping tests if DATABASE_URL is not set.
async fn get_test_pool() -> Option<PgPool> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            None
        }
    }
}

async fn insert_segment(pool: &PgPool, segment: &Segment) {
    sqlx::query(
        r#"
        INSERT INTO segments (id, name, description, criteria, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(segment.id)
    .bind(&segment.name)
    .bind(&segment.description)
    .bind(&segment.criteria)
    .bind(segment.created_at)
    .execute(pool)
    .await
    .expect("Failed to insert segment");
}

async fn insert_user(pool: &PgPool, user: &User) {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, gender, income_level, income_type, segment_ids, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.gender)
    .bind(user.income_level)
    .bind(&user.income_type)
    .bind(&user.segment_ids)
    .bind(user.created_at)
    .execute(pool)
    .await
    .expect("Failed to insert user");
}

async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

fn ids<T>(rows: &[T], id: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    rows.iter().map(id).collect()
}

/// Cleanup helper to remove test data.
async fn cleanup(pool: &PgPool, segments: &[Uuid], users: &[Uuid]) {
    let _ = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(users)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM segments WHERE id = ANY($1)")
        .bind(segments)
        .execute(pool)
        .await;
}

#[tokio::test]
async fn test_segment_statistics_end_to_end() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;
    let store = PgStore::new(pool.clone());

    let a = Segment::new("A");
    let b = Segment::new("B");
    let unrelated = Uuid::new_v4();
    let users = vec![
        User::new("first", vec![a.id])
            .with_gender("Male")
            .with_income(1200.0, "yearly"),
        User::new("second", vec![a.id, unrelated])
            .with_gender("Female")
            .with_income(200.0, "monthly"),
    ];
    insert_segment(&pool, &a).await;
    insert_segment(&pool, &b).await;
    for user in &users {
        insert_user(&pool, user).await;
    }

    let stats = compute_segment_statistics(&store, &[a.id, b.id]).await;
    cleanup(
        &pool,
        &[a.id, b.id],
        &users.iter().map(|u| u.id).collect::<Vec<_>>(),
    )
    .await;

    let stats: HashMap<Uuid, _> = stats.expect("Aggregation failed");
    assert_eq!(stats.len(), 1);
    let a_stats = &stats[&a.id];
    assert_eq!(a_stats.user_count, 2);
    assert_eq!(a_stats.avg_income, Some(150));
    assert_eq!(a_stats.top_gender, Gender::Male);
    assert!(!stats.contains_key(&b.id));
    assert!(!stats.contains_key(&unrelated));
}

#[tokio::test]
async fn test_gender_breakdown_percentages() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;
    let store = PgStore::new(pool.clone());

    let segment = Segment::new("Breakdown");
    let users = vec![
        User::new("u1", vec![segment.id]).with_gender("Female"),
        User::new("u2", vec![segment.id]).with_gender("Female"),
        User::new("u3", vec![segment.id]).with_gender("Male"),
    ];
    insert_segment(&pool, &segment).await;
    for user in &users {
        insert_user(&pool, user).await;
    }

    let breakdown = compute_gender_breakdown(&store, segment.id).await;
    let empty = compute_gender_breakdown(&store, Uuid::new_v4()).await;
    cleanup(
        &pool,
        &[segment.id],
        &users.iter().map(|u| u.id).collect::<Vec<_>>(),
    )
    .await;

    let breakdown = breakdown.expect("Aggregation failed");
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].gender.as_deref(), Some("Female"));
    assert_eq!(breakdown[0].user_count, 2);
    assert_eq!(breakdown[0].user_percentage, 67);
    assert_eq!(breakdown[1].gender.as_deref(), Some("Male"));
    assert_eq!(breakdown[1].user_percentage, 33);

    assert!(empty.expect("Aggregation failed").is_empty());
}

#[tokio::test]
async fn test_get_segment_round_trip() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;
    let store = PgStore::new(pool.clone());

    let segment = Segment::new("Lookup");
    insert_segment(&pool, &segment).await;

    let found = store.get_segment(segment.id).await;
    let missing = store.get_segment(Uuid::new_v4()).await;
    cleanup(&pool, &[segment.id], &[]).await;

    let found = found.expect("Query failed").expect("Segment missing");
    assert_eq!(found.id, segment.id);
    assert_eq!(found.name, "Lookup");
    assert!(missing.expect("Query failed").is_none());
}

#[tokio::test]
async fn test_list_segments_window_in_insertion_order() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;
    let store = PgStore::new(pool.clone());

    // Same created_at and descending ids: only the insertion sequence orders them.
    let created_at = time::OffsetDateTime::now_utc();
    let mut segments: Vec<Segment> = ["first", "second", "third"]
        .into_iter()
        .map(|name| Segment {
            created_at,
            ..Segment::new(name)
        })
        .collect();
    let mut sorted_ids = ids(&segments, |s| s.id);
    sorted_ids.sort_unstable_by(|a, b| b.cmp(a));
    for (segment, id) in segments.iter_mut().zip(sorted_ids) {
        segment.id = id;
    }

    let existing = count_rows(&pool, "segments").await;
    for segment in &segments {
        insert_segment(&pool, segment).await;
    }

    let first = store
        .list_segments(Page {
            limit: 2,
            skip: existing,
        })
        .await;
    let rest = store
        .list_segments(Page {
            limit: 10,
            skip: existing + 2,
        })
        .await;
    cleanup(&pool, &ids(&segments, |s| s.id), &[]).await;

    let (first, first_total) = first.expect("Query failed");
    let (rest, rest_total) = rest.expect("Query failed");
    let names: Vec<&str> = first.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "third");
    assert_eq!(first_total, existing + 3);
    assert_eq!(rest_total, first_total);
}

#[tokio::test]
async fn test_scan_cap_limits_users_considered() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;

    let segment = Segment::new("Capped");
    let users = vec![
        User::new("early", vec![segment.id])
            .with_gender("Female")
            .with_income(100.0, "monthly"),
        User::new("late", vec![segment.id])
            .with_gender("Male")
            .with_income(300.0, "monthly"),
    ];
    insert_segment(&pool, &segment).await;
    let existing = count_rows(&pool, "users").await;
    for user in &users {
        insert_user(&pool, user).await;
    }

    let capped = PgStore::new(pool.clone()).with_scan_cap(Some(existing + 1));
    let uncapped = PgStore::new(pool.clone());
    let capped_stats = compute_segment_statistics(&capped, &[segment.id]).await;
    let capped_genders = compute_gender_breakdown(&capped, segment.id).await;
    let full_stats = compute_segment_statistics(&uncapped, &[segment.id]).await;
    cleanup(&pool, &[segment.id], &ids(&users, |u| u.id)).await;

    let capped_stats = capped_stats.expect("Aggregation failed");
    let stats = &capped_stats[&segment.id];
    assert_eq!(stats.user_count, 1);
    assert_eq!(stats.avg_income, Some(100));
    assert_eq!(stats.top_gender, Gender::Female);

    let capped_genders = capped_genders.expect("Aggregation failed");
    assert_eq!(capped_genders.len(), 1);
    assert_eq!(capped_genders[0].gender.as_deref(), Some("Female"));
    assert_eq!(capped_genders[0].user_percentage, 100);

    let full_stats = full_stats.expect("Aggregation failed");
    assert_eq!(full_stats[&segment.id].user_count, 2);
    assert_eq!(full_stats[&segment.id].avg_income, Some(200));
}

#[tokio::test]
async fn test_gender_breakdown_missing_gender_sorts_last() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;
    let store = PgStore::new(pool.clone());

    let segment = Segment::new("Nulls");
    let users = vec![
        User::new("u1", vec![segment.id]),
        User::new("u2", vec![segment.id]).with_gender("Male"),
        User::new("u3", vec![segment.id]).with_gender("Female"),
    ];
    insert_segment(&pool, &segment).await;
    for user in &users {
        insert_user(&pool, user).await;
    }

    let breakdown = compute_gender_breakdown(&store, segment.id).await;
    cleanup(&pool, &[segment.id], &ids(&users, |u| u.id)).await;

    let breakdown = breakdown.expect("Aggregation failed");
    let genders: Vec<Option<&str>> = breakdown.iter().map(|b| b.gender.as_deref()).collect();
    assert_eq!(genders, vec![Some("Female"), Some("Male"), None]);
    assert!(breakdown.iter().all(|b| b.user_percentage == 33));
}

#[tokio::test]
async fn test_average_income_ignores_missing_income() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let _guard = DB_LOCK.lock().await;
    let store = PgStore::new(pool.clone());

    let segment = Segment::new("Partial income");
    let users = vec![
        User::new("reported", vec![segment.id])
            .with_gender("Prefer not to say")
            .with_income(100.0, "monthly"),
        User::new("silent", vec![segment.id]),
    ];
    insert_segment(&pool, &segment).await;
    for user in &users {
        insert_user(&pool, user).await;
    }

    let stats = compute_segment_statistics(&store, &[segment.id]).await;
    cleanup(&pool, &[segment.id], &ids(&users, |u| u.id)).await;

    let stats = stats.expect("Aggregation failed");
    let stats = &stats[&segment.id];
    assert_eq!(stats.user_count, 2);
    assert_eq!(stats.avg_income, Some(100));
    assert_eq!(stats.top_gender, Gender::Male);
}

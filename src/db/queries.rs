use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgExecutor, PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::api::PredictionStats;
use crate::models::job::{fixture_key, Category, JobStatus, PredictionJob};

const JOB_COLUMNS: &str = "id, team_a, team_b, category, status, result_payload, tally, \
                           team_a_logo, team_b_logo, created_at";

fn job_from_row(row: &PgRow) -> Result<PredictionJob, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let category: String = row.try_get("category")?;

    Ok(PredictionJob {
        id: row.try_get("id")?,
        team_a: row.try_get("team_a")?,
        team_b: row.try_get("team_b")?,
        category: Category::from_str(&category).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        status: JobStatus::from_str(&status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        result_payload: row.try_get("result_payload")?,
        tally: row.try_get("tally")?,
        team_a_logo: row.try_get("team_a_logo")?,
        team_b_logo: row.try_get("team_b_logo")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a new job row.
pub async fn insert_job(
    executor: impl PgExecutor<'_>,
    job: &PredictionJob,
) -> Result<PredictionJob, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO prediction_jobs (id, team_a, team_b, category, status, result_payload, tally, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {JOB_COLUMNS}
        "#
    );

    let row = sqlx::query(&sql)
        .bind(job.id)
        .bind(&job.team_a)
        .bind(&job.team_b)
        .bind(job.category.to_string())
        .bind(job.status.to_string())
        .bind(&job.result_payload)
        .bind(job.tally)
        .bind(job.created_at)
        .fetch_one(executor)
        .await?;

    job_from_row(&row)
}

/// Most recent job for the fixture (either team order, any case) created
/// after `since`.
pub async fn find_recent_fixture(
    executor: impl PgExecutor<'_>,
    team_a: &str,
    team_b: &str,
    category: Category,
    since: DateTime<Utc>,
) -> Result<Option<PredictionJob>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM prediction_jobs
        WHERE category = $3
          AND created_at >= $4
          AND ((lower(team_a) = lower($1) AND lower(team_b) = lower($2))
               OR (lower(team_a) = lower($2) AND lower(team_b) = lower($1)))
        ORDER BY created_at DESC
        LIMIT 1
        "#
    );

    let row = sqlx::query(&sql)
        .bind(team_a)
        .bind(team_b)
        .bind(category.to_string())
        .bind(since)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Bump the request tally of a job.
pub async fn increment_tally(
    executor: impl PgExecutor<'_>,
    job_id: Uuid,
) -> Result<PredictionJob, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE prediction_jobs
        SET tally = tally + 1
        WHERE id = $1
        RETURNING {JOB_COLUMNS}
        "#
    );

    let row = sqlx::query(&sql).bind(job_id).fetch_one(executor).await?;
    job_from_row(&row)
}

/// Attach to a reusable job for the fixture, or insert `candidate`.
///
/// Runs in one transaction holding an advisory lock on the fixture key, so two
/// concurrent requests for the same fixture cannot both insert. Returns the
/// job and whether it was newly created.
pub async fn attach_or_create(
    pool: &PgPool,
    candidate: &PredictionJob,
    since: DateTime<Utc>,
) -> Result<(PredictionJob, bool), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let key = fixture_key(&candidate.team_a, &candidate.team_b, candidate.category);
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(&key)
        .execute(&mut *tx)
        .await?;

    let existing = find_recent_fixture(
        &mut *tx,
        &candidate.team_a,
        &candidate.team_b,
        candidate.category,
        since,
    )
    .await?;

    let result = match existing {
        Some(job) if job.status != JobStatus::Failed => (increment_tally(&mut *tx, job.id).await?, false),
        _ => (insert_job(&mut *tx, candidate).await?, true),
    };

    tx.commit().await?;
    Ok(result)
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<PredictionJob>, sqlx::Error> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM prediction_jobs WHERE id = $1");
    let row = sqlx::query(&sql).bind(job_id).fetch_optional(pool).await?;
    row.as_ref().map(job_from_row).transpose()
}

/// Store a generated prediction. Only applies to jobs still `processing`.
pub async fn complete_generation(
    pool: &PgPool,
    job_id: Uuid,
    payload: &serde_json::Value,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE prediction_jobs
        SET status = 'pending',
            result_payload = $2
        WHERE id = $1 AND status = 'processing'
        "#,
    )
    .bind(job_id)
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Record a generation failure. Only applies to jobs still `processing`.
pub async fn fail_job(pool: &PgPool, job_id: Uuid, error: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE prediction_jobs
        SET status = 'failed',
            result_payload = jsonb_build_object('error', $2::text)
        WHERE id = $1 AND status = 'processing'
        "#,
    )
    .bind(job_id)
    .bind(error)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Resolve a pending job to won/lost and backfill logos.
pub async fn resolve_job(
    pool: &PgPool,
    job_id: Uuid,
    status: JobStatus,
    team_a_logo: Option<&str>,
    team_b_logo: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE prediction_jobs
        SET status = $2,
            team_a_logo = COALESCE($3, team_a_logo),
            team_b_logo = COALESCE($4, team_b_logo)
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(job_id)
    .bind(status.to_string())
    .bind(team_a_logo)
    .bind(team_b_logo)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Pending jobs created after `since`, oldest first.
pub async fn get_pending_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<PredictionJob>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM prediction_jobs
        WHERE status = 'pending' AND created_at >= $1
        ORDER BY created_at ASC
        "#
    );

    let rows = sqlx::query(&sql).bind(since).fetch_all(pool).await?;
    rows.iter().map(job_from_row).collect()
}

/// Newest jobs first.
pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<PredictionJob>, sqlx::Error> {
    let sql = format!(
        "SELECT {JOB_COLUMNS} FROM prediction_jobs ORDER BY created_at DESC LIMIT $1"
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;
    rows.iter().map(job_from_row).collect()
}

/// Per-status counts across the whole table.
pub async fn status_counts(pool: &PgPool) -> Result<PredictionStats, sqlx::Error> {
    let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM prediction_jobs GROUP BY status")
        .fetch_all(pool)
        .await?;

    let mut stats = PredictionStats::default();
    for row in rows {
        let status: String = row.try_get("status")?;
        let n: i64 = row.try_get("n")?;
        stats.total += n;
        match JobStatus::from_str(&status) {
            Ok(JobStatus::Processing) => stats.processing = n,
            Ok(JobStatus::Pending) => stats.pending = n,
            Ok(JobStatus::Won) => stats.won = n,
            Ok(JobStatus::Lost) => stats.lost = n,
            Ok(JobStatus::Failed) => stats.failed = n,
            Err(_) => {}
        }
    }

    Ok(stats.with_accuracy())
}

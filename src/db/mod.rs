//! Database module for PostgreSQL persistence

pub mod models;
pub mod repository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "CLAIM_INTEL_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "CLAIM_INTEL_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "CLAIM_INTEL_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "CLAIM_INTEL_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "CLAIM_INTEL_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "claim_intel";
const DEFAULT_POSTGRES_PASSWORD: &str = "claim_intel";
const DEFAULT_POSTGRES_DB: &str = "claim_intel";

// PostgreSQL unique-violation SQLSTATE
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DbError {
    /// Map an insert error, turning a unique violation into `Conflict`
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                return DbError::Conflict(what.to_string());
            }
        }
        DbError::Connection(err)
    }
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accident_reports (
            id BIGSERIAL PRIMARY KEY,
            reporter_id BIGINT NOT NULL,
            accident_date TIMESTAMPTZ NOT NULL,
            accident_location TEXT NOT NULL,
            weather_condition VARCHAR(100) NOT NULL,
            road_condition VARCHAR(100) NOT NULL,
            traffic_condition VARCHAR(100) NOT NULL,
            vehicle_make VARCHAR(100) NOT NULL,
            vehicle_model VARCHAR(100) NOT NULL,
            vehicle_year INTEGER NOT NULL,
            vehicle_plate VARCHAR(20) NOT NULL,
            vehicle_color VARCHAR(50) NOT NULL,
            incident_description TEXT NOT NULL,
            damage_description TEXT NOT NULL,
            injuries_description TEXT,
            other_party_name VARCHAR(200),
            other_party_ic VARCHAR(50),
            other_party_phone VARCHAR(50),
            other_party_vehicle VARCHAR(200),
            status VARCHAR(20) NOT NULL DEFAULT 'submitted',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accident_photos (
            id BIGSERIAL PRIMARY KEY,
            report_id BIGINT NOT NULL REFERENCES accident_reports(id),
            filename VARCHAR(255) NOT NULL,
            file_path TEXT NOT NULL,
            description TEXT,
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS officer_statements (
            id BIGSERIAL PRIMARY KEY,
            accident_report_id BIGINT NOT NULL UNIQUE REFERENCES accident_reports(id),
            officer_id BIGINT NOT NULL,
            officer_findings TEXT NOT NULL,
            fault_determination VARCHAR(200) NOT NULL,
            recommended_action VARCHAR(200) NOT NULL,
            case_number VARCHAR(100) NOT NULL UNIQUE,
            status VARCHAR(20) NOT NULL DEFAULT 'draft',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // UNIQUE (accident_report_id) backs the one-analysis-per-report invariant
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS claim_analyses (
            id BIGSERIAL PRIMARY KEY,
            accident_report_id BIGINT NOT NULL UNIQUE REFERENCES accident_reports(id),
            photo_analysis TEXT NOT NULL,
            damage_assessment TEXT NOT NULL,
            consistency_score DOUBLE PRECISION NOT NULL,
            confidence_score DOUBLE PRECISION NOT NULL,
            discrepancy_analysis TEXT NOT NULL,
            key_discrepancies JSONB NOT NULL DEFAULT '[]',
            consistency_assessment TEXT NOT NULL,
            recommendation VARCHAR(20) NOT NULL,
            risk_factors JSONB NOT NULL DEFAULT '[]',
            supporting_evidence JSONB NOT NULL DEFAULT '[]',
            claim_status VARCHAR(30) NOT NULL,
            claim_amount DOUBLE PRECISION,
            notes TEXT,
            analyzed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes separately
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_accident_reports_status ON accident_reports(status)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_accident_photos_report_id ON accident_photos(report_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}

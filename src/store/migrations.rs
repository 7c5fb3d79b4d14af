//! Relational schema for the marketplace tables. The JSON endpoints do not
//! read these tables; the `migrate` binary creates them ahead of the move to
//! PostgreSQL.

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// DDL statements in dependency order. Every statement is idempotent.
pub const SCHEMA_STATEMENTS: [(&str, &str); 4] = [
    (
        "users",
        r#"CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT UNIQUE,
    password TEXT,
    first_name TEXT,
    last_name TEXT,
    user_type TEXT NOT NULL DEFAULT 'tourist',
    phone_number TEXT,
    phone_verified BOOLEAN NOT NULL DEFAULT FALSE,
    firebase_uid TEXT UNIQUE,
    profile_image TEXT,
    bio TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
    ),
    (
        "guide_profiles",
        r#"CREATE TABLE IF NOT EXISTS guide_profiles (
    id SERIAL PRIMARY KEY,
    user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    city TEXT NOT NULL,
    languages TEXT[] NOT NULL DEFAULT '{}',
    specialties TEXT[] NOT NULL DEFAULT '{}',
    fee INTEGER NOT NULL DEFAULT 6000,
    rating NUMERIC(3, 2),
    review_count INTEGER NOT NULL DEFAULT 0,
    introduction TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
    ),
    (
        "bookings",
        r#"CREATE TABLE IF NOT EXISTS bookings (
    id SERIAL PRIMARY KEY,
    tourist_id INTEGER NOT NULL REFERENCES users(id),
    guide_id INTEGER NOT NULL REFERENCES users(id),
    date DATE NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    total_price INTEGER NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
    ),
    (
        "reviews",
        r#"CREATE TABLE IF NOT EXISTS reviews (
    id SERIAL PRIMARY KEY,
    booking_id INTEGER NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    reviewer_id INTEGER NOT NULL REFERENCES users(id),
    reviewee_id INTEGER NOT NULL REFERENCES users(id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
    ),
];

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to create PostgreSQL connection pool")
}

/// Apply every statement inside one transaction.
pub async fn run(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to open transaction")?;
    for (table, ddl) in SCHEMA_STATEMENTS {
        sqlx::query(ddl)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create table {}", table))?;
        log::info!("table {} ready", table);
    }
    tx.commit().await.context("Failed to commit schema")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_created_before_referenced() {
        for (index, (_, ddl)) in SCHEMA_STATEMENTS.iter().enumerate() {
            for (referenced, _) in SCHEMA_STATEMENTS.iter().skip(index + 1) {
                assert!(
                    !ddl.contains(&format!("REFERENCES {}(", referenced)),
                    "statement {} references later table {}",
                    index,
                    referenced
                );
            }
        }
    }

    #[test]
    fn test_statements_are_idempotent() {
        for (table, ddl) in SCHEMA_STATEMENTS {
            assert!(ddl.starts_with(&format!("CREATE TABLE IF NOT EXISTS {} (", table)));
        }
    }
}

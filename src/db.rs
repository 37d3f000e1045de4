use sqlx::{postgres::PgPoolOptions, PgPool};

/// The schema is idempotent and executed on every startup.
const SCHEMA_SQL: &str = include_str!("../db/schema.sql");

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }
}

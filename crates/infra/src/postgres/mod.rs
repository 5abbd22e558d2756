//! PostgreSQL adapters.
//!
//! ## Ownership
//!
//! Every query that touches an existing project or task carries the caller's
//! id in its `WHERE` clause (directly, or through a join on `projects` for
//! tasks), so the ownership check and the read/write are one statement or one
//! transaction.

mod projects;
mod rows;
mod users;

pub use projects::PostgresProjectStore;
pub use users::PostgresUserStore;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::DatabaseSettings;
use crate::error::{StoreError, map_sqlx_error};

const SCHEMA: &str = include_str!("schema.sql");

/// Open a pool and make sure the schema exists.
pub async fn connect(settings: &DatabaseSettings, url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .map_err(|e| map_sqlx_error("apply_schema", e))?;

    info!(max_connections = settings.max_connections, "postgres store ready");
    Ok(pool)
}

//! Implementation of PostgreSQL data handler.
//!
//! The unique index on (employee_id, anniversary_year) is the one
//! correctness-critical schema element: it is what lets multiple sweep
//! instances run concurrently without double-creating records.

use sqlx::postgres::{PgPoolOptions, Postgres};

pub mod employee_handler;
pub mod shipment_handler;

/// Struct to handle connections to postgres databases
pub struct PostgresDB {
    /// pool is made public to allow extending this struct outside of the library
    pub pool: sqlx::Pool<Postgres>,
}

impl PostgresDB {
    pub async fn new(connection_string: &str) -> Result<PostgresDB, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        Ok(PostgresDB { pool })
    }

    /// Clean database by dropping all tables and then run init
    pub async fn clean(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DROP TABLE IF EXISTS shipments")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS employees")
            .execute(&self.pool)
            .await?;
        self.init().await
    }

    /// Initialize new database by creating tables
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS employees (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                birth_date DATE NOT NULL,
                organization_id INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS shipments (
                id SERIAL PRIMARY KEY,
                employee_id INTEGER NOT NULL,
                anniversary_year INTEGER NOT NULL,
                status TEXT NOT NULL,
                trigger_date DATE,
                sent_date DATE,
                notes TEXT,
                FOREIGN KEY(employee_id) REFERENCES employees(id),
                UNIQUE (employee_id, anniversary_year)
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

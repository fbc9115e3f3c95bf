use std::{str::FromStr, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;

use hr_roster_core::{Employee, EmployeeStore, InsertOutcome};

/// SQLite extended result code for a PRIMARY KEY violation.
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
/// SQLite extended result code for a UNIQUE violation.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// The database file is created when missing. Pragmas are applied to
    /// every connection the pool opens.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(5000));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to the employees table.
    pub fn employees(&self) -> EmployeeRepository {
        EmployeeRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a trivial query to confirm the pool can serve connections.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Waits for checked-out connections to return and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository backing the employee roster.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeStore for EmployeeRepository {
    type Error = EmployeeStoreError;

    async fn insert(&self, employee: &Employee) -> Result<InsertOutcome, EmployeeStoreError> {
        let now = to_rfc3339(Utc::now());
        let result = sqlx::query_as::<_, EmployeeRow>(
            "INSERT INTO employees \
             (employee_id, first_name, last_name, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING employee_id, first_name, last_name, status",
        )
        .bind(&employee.employee_id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(i64::from(employee.status))
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(InsertOutcome::Inserted(row.into_domain())),
            Err(sqlx::Error::Database(db_err)) => {
                let conflict = matches!(
                    db_err.code().as_deref(),
                    Some(SQLITE_CONSTRAINT_PRIMARYKEY) | Some(SQLITE_CONSTRAINT_UNIQUE)
                );
                if conflict {
                    return Ok(InsertOutcome::Duplicate);
                }

                Err(EmployeeStoreError::Database(sqlx::Error::Database(db_err)))
            }
            Err(err) => Err(EmployeeStoreError::Database(err)),
        }
    }

    async fn fetch(&self, employee_id: &str) -> Result<Option<Employee>, EmployeeStoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT employee_id, first_name, last_name, status FROM employees WHERE employee_id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EmployeeRow::into_domain))
    }

    async fn list_all(&self) -> Result<Vec<Employee>, EmployeeStoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            "SELECT employee_id, first_name, last_name, status FROM employees ORDER BY employee_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EmployeeRow::into_domain).collect())
    }

    async fn list_by_status(&self, status: bool) -> Result<Vec<Employee>, EmployeeStoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            "SELECT employee_id, first_name, last_name, status FROM employees \
             WHERE status = ? ORDER BY employee_id",
        )
        .bind(i64::from(status))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EmployeeRow::into_domain).collect())
    }

    async fn set_status(
        &self,
        employee_id: &str,
        status: bool,
    ) -> Result<Option<Employee>, EmployeeStoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "UPDATE employees \
             SET status = ?, \
                 updated_at = ? \
             WHERE employee_id = ? \
             RETURNING employee_id, first_name, last_name, status",
        )
        .bind(i64::from(status))
        .bind(to_rfc3339(Utc::now()))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EmployeeRow::into_domain))
    }
}

/// Row shape of the `employees` table without store metadata.
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    employee_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    status: i64,
}

impl EmployeeRow {
    fn into_domain(self) -> Employee {
        Employee {
            employee_id: self.employee_id,
            first_name: self.first_name,
            last_name: self.last_name,
            status: self.status != 0,
        }
    }
}

/// Errors surfaced by [`EmployeeRepository`].
#[derive(Debug, Error)]
pub enum EmployeeStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub mod queries;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

use crate::configuration::DatabaseSettings;

/// Failure of a single data-access call.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type QueryResult<T> = Result<T, QueryError>;

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(settings.url.expose_secret())?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub(crate) mod test_support {
    use secrecy::SecretString;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    use super::{establish_connection, run_migrations};
    use crate::configuration::DatabaseSettings;

    /// Migrated database in a temporary directory; dropping the dir removes the file.
    pub async fn migrated_pool() -> (TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let settings = DatabaseSettings {
            url: SecretString::from(format!(
                "sqlite:{}",
                dir.path().join("trivia.db").display()
            )),
            max_connections: 1,
            run_migrations: true,
        };
        let pool = establish_connection(&settings).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, pool)
    }
}

//! Relational metadata backend.
//!
//! [`SqlMetadataBackend`] owns the connection pool and implements the upload
//! and user repositories on top of it. The SQL it issues is portable across
//! MySQL and SQLite: identifiers are quoted with backticks and placeholders
//! are `?`. Only upserts differ between the two dialects.

use std::sync::Arc;

use sqlx::AnyPool;

use crate::{
    configs::{connect_database, Driver, MetadataBackendConfig},
    error::MetadataResult,
    modules::{upload::repository::UploadRepository, user::repository::UserRepository},
};

/// Everything the upload handlers, expiry sweepers and auth middleware rely on.
pub trait MetadataBackend: UploadRepository + UserRepository {}

impl<T> MetadataBackend for T where T: UploadRepository + UserRepository {}

// String columns are VARCHAR only: the Any driver reports MySQL TEXT as a
// blob, which does not decode into String.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS `uploads` (
        `id` VARCHAR(255) NOT NULL,
        `uploadDate` BIGINT NOT NULL DEFAULT 0,
        `ttl` BIGINT NOT NULL DEFAULT 0,
        `user` VARCHAR(255) NULL,
        `token` VARCHAR(255) NULL,
        `comments` VARCHAR(4096) NULL,
        `downloadDomain` VARCHAR(255) NULL,
        `remoteIp` VARCHAR(255) NULL,
        `uploadToken` VARCHAR(255) NULL,
        `oneShot` BIGINT NOT NULL DEFAULT 0,
        `removable` BIGINT NOT NULL DEFAULT 0,
        `stream` BIGINT NOT NULL DEFAULT 0,
        `protectedByPassword` BIGINT NOT NULL DEFAULT 0,
        `login` VARCHAR(255) NULL,
        `password` VARCHAR(255) NULL,
        PRIMARY KEY (`id`)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS `files` (
        `id` VARCHAR(255) NOT NULL,
        `uploadId` VARCHAR(255) NOT NULL,
        `fileName` VARCHAR(1024) NOT NULL DEFAULT '',
        `fileMd5` VARCHAR(255) NOT NULL DEFAULT '',
        `status` VARCHAR(64) NOT NULL DEFAULT '',
        `fileType` VARCHAR(255) NOT NULL DEFAULT '',
        `fileUploadDate` BIGINT NOT NULL DEFAULT 0,
        `fileSize` BIGINT NOT NULL DEFAULT 0,
        `reference` VARCHAR(255) NOT NULL DEFAULT '',
        `backendDetails` VARCHAR(4096) NULL,
        PRIMARY KEY (`id`),
        FOREIGN KEY (`uploadId`) REFERENCES `uploads` (`id`)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS `users` (
        `id` VARCHAR(255) NOT NULL,
        `login` VARCHAR(255) NOT NULL DEFAULT '',
        `name` VARCHAR(255) NOT NULL DEFAULT '',
        `email` VARCHAR(255) NOT NULL DEFAULT '',
        PRIMARY KEY (`id`)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS `usersTokens` (
        `token` VARCHAR(255) NOT NULL,
        `userId` VARCHAR(255) NOT NULL,
        `creationDate` BIGINT NOT NULL DEFAULT 0,
        `comment` VARCHAR(1024) NULL,
        PRIMARY KEY (`token`),
        FOREIGN KEY (`userId`) REFERENCES `users` (`id`)
    )
    "#,
];

#[derive(Clone)]
pub struct SqlMetadataBackend {
    pool: AnyPool,
    driver: Driver,
}

impl SqlMetadataBackend {
    /// Connects with `config` and makes sure the schema exists.
    pub async fn connect(config: &MetadataBackendConfig) -> MetadataResult<Self> {
        let pool = connect_database(config).await?;
        let backend = Self::from_pool(pool, config.driver);
        backend.migrate().await?;
        Ok(backend)
    }

    pub fn from_pool(pool: AnyPool, driver: Driver) -> Self {
        Self { pool, driver }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub async fn migrate(&self) -> MetadataResult<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        log::debug!("Metadata schema is up to date");
        Ok(())
    }

    pub async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn insert_sql(&self, table: &str, columns: &[&str]) -> String {
        insert_sql(table, columns)
    }

    pub(crate) fn upsert_sql(&self, table: &str, columns: &[&str], key: &str) -> String {
        upsert_sql(self.driver, table, columns, key)
    }
}

/// Builds a backend from configuration, ready to be shared across request handlers.
pub async fn from_config(config: &MetadataBackendConfig) -> MetadataResult<Arc<dyn MetadataBackend>> {
    let backend = SqlMetadataBackend::connect(config).await?;
    Ok(Arc::new(backend) as Arc<dyn MetadataBackend>)
}

fn column_list(columns: &[&str]) -> String {
    columns.iter().map(|c| format!("`{}`", c)).collect::<Vec<_>>().join(", ")
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO `{}` ({}) VALUES ({})", table, column_list(columns), placeholders)
}

/// Insert-or-update keyed by `key`. The existing row is updated in place, never
/// deleted, so rows referencing it stay valid.
fn upsert_sql(driver: Driver, table: &str, columns: &[&str], key: &str) -> String {
    let updates = columns.iter().filter(|c| **c != key);
    let assignments = match driver {
        Driver::Mysql => updates.map(|c| format!("`{0}` = VALUES(`{0}`)", c)).collect::<Vec<_>>(),
        Driver::Sqlite => updates.map(|c| format!("`{0}` = excluded.`{0}`", c)).collect::<Vec<_>>(),
    };
    let assignments = assignments.join(", ");

    match driver {
        Driver::Mysql => {
            format!("{} ON DUPLICATE KEY UPDATE {}", insert_sql(table, columns), assignments)
        }
        Driver::Sqlite => format!(
            "{} ON CONFLICT (`{}`) DO UPDATE SET {}",
            insert_sql(table, columns),
            key,
            assignments
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement() {
        assert_eq!(
            insert_sql("files", &["id", "uploadId"]),
            "INSERT INTO `files` (`id`, `uploadId`) VALUES (?, ?)"
        );
    }

    #[test]
    fn mysql_upsert_updates_non_key_columns() {
        assert_eq!(
            upsert_sql(Driver::Mysql, "usersTokens", &["token", "userId", "comment"], "token"),
            "INSERT INTO `usersTokens` (`token`, `userId`, `comment`) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE `userId` = VALUES(`userId`), `comment` = VALUES(`comment`)"
        );
    }

    #[test]
    fn sqlite_upsert_targets_key() {
        assert_eq!(
            upsert_sql(Driver::Sqlite, "users", &["id", "login"], "id"),
            "INSERT INTO `users` (`id`, `login`) VALUES (?, ?) \
             ON CONFLICT (`id`) DO UPDATE SET `login` = excluded.`login`"
        );
    }

    #[test]
    fn schema_has_no_blob_typed_string_columns() {
        for statement in SCHEMA {
            let upper = statement.to_ascii_uppercase();
            for word in upper.split(|c: char| !c.is_ascii_alphanumeric()) {
                assert!(
                    !matches!(word, "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "BLOB"),
                    "{} column in: {}",
                    word,
                    statement
                );
            }
        }
    }
}

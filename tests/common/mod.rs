//! Shared fixtures for the metadata backend integration tests.

#![allow(dead_code)]

use tempfile::TempDir;
use upload_metadata::{File, MetadataBackendConfig, SqlMetadataBackend, Token, Upload, User};

/// A backend over a throwaway sqlite database, deleted on drop.
pub struct TestMetadata {
    pub backend: SqlMetadataBackend,
    _temp_dir: TempDir,
}

impl TestMetadata {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("metadata.db");
        let config = MetadataBackendConfig::sqlite(db_path.to_string_lossy());
        let backend =
            SqlMetadataBackend::connect(&config).await.expect("Failed to open metadata backend");

        Self { backend, _temp_dir: temp_dir }
    }

    /// Runs a `SELECT COUNT(*) ...` query with a single bound argument.
    pub async fn count(&self, sql: &str, arg: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(arg)
            .fetch_one(self.backend.pool())
            .await
            .expect("Failed to count rows")
    }

    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql).execute(self.backend.pool()).await.expect("Failed to execute statement");
    }
}

pub fn file(id: &str) -> File {
    let mut file = File::new(id, format!("{}.bin", id));
    file.md5 = format!("md5-{}", id);
    file.status = "uploaded".to_string();
    file.mime_type = "application/octet-stream".to_string();
    file.size = 1024;
    file.upload_date = 1_700_000_000;
    file
}

pub fn upload(id: &str, file_ids: &[&str]) -> Upload {
    let mut upload = Upload::new(id);
    for file_id in file_ids {
        upload.add_file(file(file_id));
    }
    upload
}

pub fn user(id: &str, tokens: &[&str]) -> User {
    let mut user = User::new(id);
    user.login = format!("{}-login", id);
    user.name = format!("User {}", id);
    user.email = format!("{}@example.com", id);
    for token in tokens {
        user.add_token(Token::new(*token));
    }
    user
}

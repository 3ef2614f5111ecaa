use std::collections::HashMap;

use crate::{
    backend::SqlMetadataBackend,
    context::Context,
    error::{MetadataError, MetadataResult},
    modules::upload::{
        model::{File, Upload},
        repository::UploadRepository,
        schema::{FILE_COLUMNS, FILES_TABLE, FileRow, UPLOAD_COLUMNS, UPLOADS_TABLE, UploadRow},
    },
    utils,
};

impl SqlMetadataBackend {
    /// Ids of uploads with a non-zero ttl for which `now > uploadDate + ttl`.
    pub async fn uploads_expired_at(&self, ctx: &Context, now: i64) -> MetadataResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT `id` FROM `uploads` WHERE `ttl` > ? AND ? > `uploadDate` + `ttl`",
        )
        .bind(0_i64)
        .bind(now)
        .fetch_all(self.pool())
        .await
        .map_err(|e| ctx.fail("Unable to get uploads to remove", e))?;

        Ok(ids)
    }
}

#[async_trait::async_trait]
impl UploadRepository for SqlMetadataBackend {
    async fn create(&self, ctx: &Context, upload: &Upload) -> MetadataResult<()> {
        if upload.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to save upload : Missing upload id",
            )));
        }
        if upload.files.values().any(|file| file.id.is_empty()) {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to save upload : Missing file id",
            )));
        }
        if let Some((key, file)) = upload.files.iter().find(|(key, file)| **key != file.id) {
            return Err(ctx.warning(MetadataError::validation(format!(
                "Unable to save upload : File {} is stored under key {}",
                file.id, key
            ))));
        }

        let upload_row = UploadRow::from(upload);
        let file_rows = upload
            .files
            .values()
            .map(|file| FileRow::from_file(file, &upload.id))
            .collect::<MetadataResult<Vec<_>>>()
            .map_err(|e| ctx.fail("Unable to save upload file", e))?;

        let mut tx =
            self.pool().begin().await.map_err(|e| ctx.fail("Unable to save upload", e))?;

        let sql = self.insert_sql(UPLOADS_TABLE, UPLOAD_COLUMNS);
        let result = upload_row.bind_values(sqlx::query(&sql)).execute(&mut *tx).await;
        if let Err(err) = result {
            if let Err(rollback_err) = tx.rollback().await {
                ctx.debug(format_args!("Rollback failed : {}", rollback_err));
            }
            return Err(ctx.fail("Unable to save upload", err));
        }

        let sql = self.insert_sql(FILES_TABLE, FILE_COLUMNS);
        for row in &file_rows {
            let result = row.bind_values(sqlx::query(&sql)).execute(&mut *tx).await;
            if let Err(err) = result {
                if let Err(rollback_err) = tx.rollback().await {
                    ctx.debug(format_args!("Rollback failed : {}", rollback_err));
                }
                return Err(ctx.fail("Unable to save upload file", err));
            }
        }

        tx.commit().await.map_err(|e| ctx.fail("Unable to save upload", e))?;
        ctx.debug(format_args!("Upload {} saved with {} file(s)", upload.id, file_rows.len()));

        Ok(())
    }

    async fn get(&self, ctx: &Context, id: &str) -> MetadataResult<Upload> {
        if id.is_empty() {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to get upload : Missing upload id",
            )));
        }

        let row = sqlx::query_as::<_, UploadRow>("SELECT * FROM `uploads` WHERE `id` = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to get upload", e))?;

        let Some(row) = row else {
            ctx.debug(format_args!("Upload {} not found", id));
            return Err(MetadataError::not_found(format!("Upload {} not found", id)));
        };

        let file_rows = sqlx::query_as::<_, FileRow>("SELECT * FROM `files` WHERE `uploadId` = ?")
            .bind(id)
            .fetch_all(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to get upload files", e))?;

        let mut files = HashMap::with_capacity(file_rows.len());
        for file_row in file_rows {
            let file = file_row.into_file().map_err(|e| ctx.fail("Unable to decode upload file", e))?;
            files.insert(file.id.clone(), file);
        }

        Ok(row.into_upload(files))
    }

    async fn add_or_update_file(
        &self,
        ctx: &Context,
        upload: &Upload,
        file: &File,
    ) -> MetadataResult<()> {
        if upload.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation("Unable to add file : Missing upload")));
        }
        if file.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation("Unable to add file : Missing file")));
        }

        let row = FileRow::from_file(file, &upload.id)
            .map_err(|e| ctx.fail("Unable to update file in upload", e))?;

        let sql = self.upsert_sql(FILES_TABLE, FILE_COLUMNS, "id");
        row.bind_values(sqlx::query(&sql))
            .execute(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to update file in upload", e))?;

        Ok(())
    }

    async fn remove_file(
        &self,
        ctx: &Context,
        upload: &Upload,
        file: &File,
    ) -> MetadataResult<()> {
        if upload.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to remove file : Missing upload",
            )));
        }
        if file.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation("Unable to remove file : Missing file")));
        }

        let removed = sqlx::query("DELETE FROM `files` WHERE `id` = ? AND `uploadId` = ?")
            .bind(&file.id)
            .bind(&upload.id)
            .execute(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to remove file from upload", e))?
            .rows_affected();

        ctx.debug(format_args!("Removed {} row(s) for file {} of upload {}", removed, file.id, upload.id));
        Ok(())
    }

    async fn remove(&self, ctx: &Context, upload: &Upload) -> MetadataResult<()> {
        if upload.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to remove upload : Missing upload",
            )));
        }

        // files first: a crash in between leaves an upload without files,
        // never files pointing at a missing upload
        sqlx::query("DELETE FROM `files` WHERE `uploadId` = ?")
            .bind(&upload.id)
            .execute(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to delete upload files", e))?;

        sqlx::query("DELETE FROM `uploads` WHERE `id` = ?")
            .bind(&upload.id)
            .execute(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to delete upload", e))?;

        Ok(())
    }

    async fn get_uploads_to_remove(&self, ctx: &Context) -> MetadataResult<Vec<String>> {
        self.uploads_expired_at(ctx, utils::unix_now()).await
    }
}

use std::collections::HashMap;

use sqlx::{
    any::{Any, AnyArguments},
    prelude::FromRow,
    query::Query,
};

use crate::{
    error::MetadataResult,
    modules::upload::model::{File, Upload},
    utils::{from_flag, to_flag},
};

pub const UPLOADS_TABLE: &str = "uploads";
pub const FILES_TABLE: &str = "files";

/// Column order matches [`UploadRow::bind_values`].
pub const UPLOAD_COLUMNS: &[&str] = &[
    "id",
    "uploadDate",
    "ttl",
    "user",
    "token",
    "comments",
    "downloadDomain",
    "remoteIp",
    "uploadToken",
    "oneShot",
    "removable",
    "stream",
    "protectedByPassword",
    "login",
    "password",
];

/// Column order matches [`FileRow::bind_values`].
pub const FILE_COLUMNS: &[&str] = &[
    "id",
    "uploadId",
    "fileName",
    "fileMd5",
    "status",
    "fileType",
    "fileUploadDate",
    "fileSize",
    "reference",
    "backendDetails",
];

#[derive(Debug, Clone, FromRow)]
pub struct UploadRow {
    pub id: String,
    #[sqlx(rename = "uploadDate")]
    pub upload_date: i64,
    pub ttl: i64,
    pub user: Option<String>,
    pub token: Option<String>,
    pub comments: Option<String>,
    #[sqlx(rename = "downloadDomain")]
    pub download_domain: Option<String>,
    #[sqlx(rename = "remoteIp")]
    pub remote_ip: Option<String>,
    #[sqlx(rename = "uploadToken")]
    pub upload_token: Option<String>,
    #[sqlx(rename = "oneShot")]
    pub one_shot: i64,
    pub removable: i64,
    pub stream: i64,
    #[sqlx(rename = "protectedByPassword")]
    pub protected_by_password: i64,
    pub login: Option<String>,
    pub password: Option<String>,
}

impl UploadRow {
    pub fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query
            .bind(&self.id)
            .bind(self.upload_date)
            .bind(self.ttl)
            .bind(&self.user)
            .bind(&self.token)
            .bind(&self.comments)
            .bind(&self.download_domain)
            .bind(&self.remote_ip)
            .bind(&self.upload_token)
            .bind(self.one_shot)
            .bind(self.removable)
            .bind(self.stream)
            .bind(self.protected_by_password)
            .bind(&self.login)
            .bind(&self.password)
    }

    /// Rebuilds the domain upload; files are attached separately.
    pub fn into_upload(self, files: HashMap<String, File>) -> Upload {
        Upload {
            id: self.id,
            creation: self.upload_date,
            ttl: self.ttl,
            user: self.user,
            token: self.token,
            comments: self.comments,
            download_domain: self.download_domain,
            remote_ip: self.remote_ip,
            upload_token: self.upload_token,
            one_shot: from_flag(self.one_shot),
            removable: from_flag(self.removable),
            stream: from_flag(self.stream),
            protected_by_password: from_flag(self.protected_by_password),
            login: self.login,
            password: self.password,
            files,
        }
    }
}

impl From<&Upload> for UploadRow {
    fn from(upload: &Upload) -> Self {
        UploadRow {
            id: upload.id.clone(),
            upload_date: upload.creation,
            ttl: upload.ttl,
            user: upload.user.clone(),
            token: upload.token.clone(),
            comments: upload.comments.clone(),
            download_domain: upload.download_domain.clone(),
            remote_ip: upload.remote_ip.clone(),
            upload_token: upload.upload_token.clone(),
            one_shot: to_flag(upload.one_shot),
            removable: to_flag(upload.removable),
            stream: to_flag(upload.stream),
            protected_by_password: to_flag(upload.protected_by_password),
            login: upload.login.clone(),
            password: upload.password.clone(),
        }
    }
}

/// A file as persisted, stamped with the id of the upload owning it.
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: String,
    #[sqlx(rename = "uploadId")]
    pub upload_id: String,
    #[sqlx(rename = "fileName")]
    pub name: String,
    #[sqlx(rename = "fileMd5")]
    pub md5: String,
    pub status: String,
    #[sqlx(rename = "fileType")]
    pub mime_type: String,
    #[sqlx(rename = "fileUploadDate")]
    pub upload_date: i64,
    #[sqlx(rename = "fileSize")]
    pub size: i64,
    pub reference: String,
    #[sqlx(rename = "backendDetails")]
    pub backend_details: Option<String>,
}

impl FileRow {
    pub fn from_file(file: &File, upload_id: &str) -> MetadataResult<Self> {
        let backend_details = if file.backend_details.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&file.backend_details)?)
        };

        Ok(FileRow {
            id: file.id.clone(),
            upload_id: upload_id.to_string(),
            name: file.name.clone(),
            md5: file.md5.clone(),
            status: file.status.clone(),
            mime_type: file.mime_type.clone(),
            upload_date: file.upload_date,
            size: file.size,
            reference: file.reference.clone(),
            backend_details,
        })
    }

    pub fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query
            .bind(&self.id)
            .bind(&self.upload_id)
            .bind(&self.name)
            .bind(&self.md5)
            .bind(&self.status)
            .bind(&self.mime_type)
            .bind(self.upload_date)
            .bind(self.size)
            .bind(&self.reference)
            .bind(&self.backend_details)
    }

    pub fn into_file(self) -> MetadataResult<File> {
        let backend_details = match self.backend_details.as_deref() {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw)?,
            _ => serde_json::Map::new(),
        };

        Ok(File {
            id: self.id,
            name: self.name,
            md5: self.md5,
            status: self.status,
            mime_type: self.mime_type,
            upload_date: self.upload_date,
            size: self.size,
            reference: self.reference,
            backend_details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_row_keeps_flags() {
        let mut upload = Upload::new("u1").with_ttl(30);
        upload.one_shot = true;
        upload.protected_by_password = true;
        upload.user = Some("alice".to_string());

        let row = UploadRow::from(&upload);
        assert_eq!(row.one_shot, 1);
        assert_eq!(row.removable, 0);

        let back = row.into_upload(HashMap::new());
        assert_eq!(back, upload);
    }

    #[test]
    fn file_row_carries_upload_id() {
        let mut file = File::new("f1", "report.pdf");
        file.backend_details.insert("path".to_string(), serde_json::json!("/data/f1"));

        let row = FileRow::from_file(&file, "u1").unwrap();
        assert_eq!(row.upload_id, "u1");
        assert_eq!(row.backend_details.as_deref(), Some(r#"{"path":"/data/f1"}"#));
        assert_eq!(row.into_file().unwrap(), file);
    }

    #[test]
    fn empty_backend_details_stored_as_null() {
        let row = FileRow::from_file(&File::new("f1", "a.txt"), "u1").unwrap();
        assert!(row.backend_details.is_none());
        assert!(row.into_file().unwrap().backend_details.is_empty());
    }
}

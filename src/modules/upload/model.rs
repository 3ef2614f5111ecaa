use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils;

/// An upload and the files it contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: String,
    /// Creation time, seconds since epoch.
    #[serde(rename = "uploadDate")]
    pub creation: i64,
    /// Seconds after creation before the upload expires, 0 means never.
    pub ttl: i64,
    pub user: Option<String>,
    pub token: Option<String>,
    pub comments: Option<String>,
    pub download_domain: Option<String>,
    pub remote_ip: Option<String>,
    pub upload_token: Option<String>,
    pub one_shot: bool,
    pub removable: bool,
    pub stream: bool,
    pub protected_by_password: bool,
    pub login: Option<String>,
    pub password: Option<String>,
    pub files: HashMap<String, File>,
}

impl Upload {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), creation: utils::unix_now(), ..Default::default() }
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn add_file(&mut self, file: File) {
        self.files.insert(file.id.clone(), file);
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        utils::is_expired(self.creation, self.ttl, now)
    }
}

/// Metadata of one uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: String,
    #[serde(rename = "fileName")]
    pub name: String,
    #[serde(rename = "fileMd5")]
    pub md5: String,
    pub status: String,
    #[serde(rename = "fileType")]
    pub mime_type: String,
    #[serde(rename = "fileUploadDate")]
    pub upload_date: i64,
    #[serde(rename = "fileSize")]
    pub size: i64,
    pub reference: String,
    #[serde(rename = "backendDetails", default)]
    pub backend_details: serde_json::Map<String, serde_json::Value>,
}

impl File {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), ..Default::default() }
    }
}

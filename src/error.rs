use std::borrow::Cow;

use sqlx::error::ErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    // argument errors, raised before the store is touched
    #[error("Validation Error: {0}")]
    Validation(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    // sqlx errors
    #[error("Database Conflict: {}", conflict_message(.0))]
    Conflict(Option<DbErrorMeta>),
    #[error("Store Error: {0}")]
    Store(#[source] sqlx::Error),
    // serde errors
    #[error("JSON Serialization/Deserialization Error: {0}")]
    Json(#[from] serde_json::Error),
    // config errors
    #[error("Invalid Configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),
    #[error("Invalid Connection Url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

#[derive(Debug)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    match &m.constraint {
        Some(constraint) => format!("{} ({})", m.message, constraint).into(),
        None => m.message.clone().into(),
    }
}

impl From<sqlx::Error> for MetadataError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return MetadataError::NotFound("Record not found".into());
        }

        if let sqlx::Error::Database(db_err) = &err {
            if let ErrorKind::UniqueViolation = db_err.kind() {
                return MetadataError::Conflict(Some(DbErrorMeta {
                    code: db_err.code().map(|s| s.to_string()),
                    constraint: db_err.constraint().map(|s| s.to_string()),
                    message: db_err.message().to_string(),
                }));
            }
            log::debug!("Unhandled DB error: {:?}", db_err);
        }

        MetadataError::Store(err)
    }
}

impl MetadataError {
    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when the relational engine itself reported the failure.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = MetadataError::from(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
        assert!(!err.is_store_error());
    }

    #[test]
    fn pool_errors_are_store_errors() {
        let err = MetadataError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_store_error());
        assert!(matches!(err, MetadataError::Store(sqlx::Error::PoolTimedOut)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn conflict_message_includes_constraint() {
        let err = MetadataError::Conflict(Some(DbErrorMeta {
            code: Some("2067".to_string()),
            constraint: Some("files.id".to_string()),
            message: "UNIQUE constraint failed".to_string(),
        }));
        assert_eq!(err.to_string(), "Database Conflict: UNIQUE constraint failed (files.id)");
        assert!(err.is_store_error());

        let bare = MetadataError::Conflict(None);
        assert_eq!(bare.to_string(), "Database Conflict: Duplicate value");
    }

    #[test]
    fn validation_is_local() {
        let err = MetadataError::validation("Unable to get user : Missing user id or token");
        assert!(err.is_validation());
        assert!(!err.is_store_error());
        assert_eq!(err.to_string(), "Validation Error: Unable to get user : Missing user id or token");
    }
}

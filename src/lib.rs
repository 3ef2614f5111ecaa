//! Metadata persistence for the upload service: uploads and their files,
//! users and their tokens, stored in a relational database.

pub mod backend;
pub mod configs;
pub mod constants;
pub mod context;
pub mod error;
pub mod modules;
pub mod utils;

pub use backend::{MetadataBackend, SqlMetadataBackend, from_config};
pub use configs::{Driver, MetadataBackendConfig};
pub use context::Context;
pub use error::{MetadataError, MetadataResult};
pub use modules::{
    sweeper::service::{ExpirySweeper, SweepReport},
    upload::{
        model::{File, Upload},
        repository::UploadRepository,
    },
    user::{
        model::{Token, User},
        repository::UserRepository,
    },
};

use crate::{
    context::Context,
    error::MetadataResult,
    modules::upload::model::{File, Upload},
};

#[async_trait::async_trait]
pub trait UploadRepository: Send + Sync {
    /// Persists the upload and all of its files atomically.
    async fn create(&self, ctx: &Context, upload: &Upload) -> MetadataResult<()>;

    /// Fails with `NotFound` when no upload has this id.
    async fn get(&self, ctx: &Context, id: &str) -> MetadataResult<Upload>;

    async fn add_or_update_file(
        &self,
        ctx: &Context,
        upload: &Upload,
        file: &File,
    ) -> MetadataResult<()>;

    async fn remove_file(&self, ctx: &Context, upload: &Upload, file: &File)
    -> MetadataResult<()>;

    /// Deletes the files of the upload, then the upload itself. Removing an
    /// upload that is already gone is not an error.
    async fn remove(&self, ctx: &Context, upload: &Upload) -> MetadataResult<()>;

    /// Ids of uploads whose ttl has elapsed at the time of the call.
    async fn get_uploads_to_remove(&self, ctx: &Context) -> MetadataResult<Vec<String>>;
}

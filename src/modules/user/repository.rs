use crate::{
    context::Context,
    error::MetadataResult,
    modules::user::model::{Token, User},
};

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Upserts the user and every token it owns in one transaction.
    async fn save_user(&self, ctx: &Context, user: &User) -> MetadataResult<()>;

    /// Resolves a user either by id or, when `id` is empty, by one of its
    /// tokens. Returns `Ok(None)` when nothing matches.
    async fn get_user(&self, ctx: &Context, id: &str, token: &str) -> MetadataResult<Option<User>>;

    /// Deletes the user's tokens, then the user.
    async fn remove_user(&self, ctx: &Context, user: &User) -> MetadataResult<()>;

    /// Ids of the uploads owned by `user`, narrowed to those made with
    /// `token` when one is given.
    async fn get_user_uploads(
        &self,
        ctx: &Context,
        user: &User,
        token: Option<&Token>,
    ) -> MetadataResult<Vec<String>>;
}

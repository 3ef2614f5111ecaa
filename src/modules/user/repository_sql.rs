use crate::{
    backend::SqlMetadataBackend,
    context::Context,
    error::{MetadataError, MetadataResult},
    modules::user::{
        model::{Token, User},
        repository::UserRepository,
        schema::{TOKEN_COLUMNS, TOKENS_TABLE, TokenRow, USER_COLUMNS, USERS_TABLE, UserRow},
    },
};

impl SqlMetadataBackend {
    async fn find_user_row(&self, ctx: &Context, id: &str) -> MetadataResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM `users` WHERE `id` = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to get user", e))
    }

    async fn find_user_tokens(&self, ctx: &Context, user_id: &str) -> MetadataResult<Vec<Token>> {
        let rows = sqlx::query_as::<_, TokenRow>("SELECT * FROM `usersTokens` WHERE `userId` = ?")
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(|e| ctx.fail("Unable to get user tokens", e))?;

        Ok(rows.into_iter().map(Token::from).collect())
    }
}

#[async_trait::async_trait]
impl UserRepository for SqlMetadataBackend {
    async fn save_user(&self, ctx: &Context, user: &User) -> MetadataResult<()> {
        if user.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation("Unable to save user : Missing user")));
        }
        if user.tokens.iter().any(|t| t.token.is_empty()) {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to save user : Missing token value",
            )));
        }

        let user_row = UserRow::from(user);
        let token_rows: Vec<TokenRow> =
            user.tokens.iter().map(|t| TokenRow::from_token(t, &user.id)).collect();

        let mut tx = self.pool().begin().await.map_err(|e| ctx.fail("Fail to save user", e))?;

        let sql = self.upsert_sql(USERS_TABLE, USER_COLUMNS, "id");
        let result = user_row.bind_values(sqlx::query(&sql)).execute(&mut *tx).await;
        if let Err(err) = result {
            if let Err(rollback_err) = tx.rollback().await {
                ctx.debug(format_args!("Rollback failed : {}", rollback_err));
            }
            return Err(ctx.fail("Fail to save user", err));
        }

        let sql = self.upsert_sql(TOKENS_TABLE, TOKEN_COLUMNS, "token");
        for row in &token_rows {
            let result = row.bind_values(sqlx::query(&sql)).execute(&mut *tx).await;
            if let Err(err) = result {
                if let Err(rollback_err) = tx.rollback().await {
                    ctx.debug(format_args!("Rollback failed : {}", rollback_err));
                }
                return Err(ctx.fail("Fail to save user token", err));
            }
        }

        tx.commit().await.map_err(|e| ctx.fail("Fail to save user", e))?;
        Ok(())
    }

    async fn get_user(&self, ctx: &Context, id: &str, token: &str) -> MetadataResult<Option<User>> {
        if id.is_empty() && token.is_empty() {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to get user : Missing user id or token",
            )));
        }

        let user_row = if !id.is_empty() {
            self.find_user_row(ctx, id).await?
        } else {
            let token_row =
                sqlx::query_as::<_, TokenRow>("SELECT * FROM `usersTokens` WHERE `token` = ?")
                    .bind(token)
                    .fetch_optional(self.pool())
                    .await
                    .map_err(|e| ctx.fail("Unable to get user token", e))?;

            match token_row {
                Some(token_row) => self.find_user_row(ctx, &token_row.user_id).await?,
                None => None,
            }
        };

        let Some(user_row) = user_row else {
            ctx.debug(format_args!("No user matches id '{}' or token", id));
            return Ok(None);
        };

        // tokens are looked up by the id actually stored on the user row
        let tokens = self.find_user_tokens(ctx, &user_row.id).await?;
        Ok(Some(user_row.into_user(tokens)))
    }

    async fn remove_user(&self, ctx: &Context, user: &User) -> MetadataResult<()> {
        if user.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation("Unable to remove user : Missing user")));
        }

        sqlx::query("DELETE FROM `usersTokens` WHERE `userId` = ?")
            .bind(&user.id)
            .execute(self.pool())
            .await
            .map_err(|e| ctx.fail("Fail to delete user tokens", e))?;

        sqlx::query("DELETE FROM `users` WHERE `id` = ?")
            .bind(&user.id)
            .execute(self.pool())
            .await
            .map_err(|e| ctx.fail("Fail to delete user", e))?;

        Ok(())
    }

    async fn get_user_uploads(
        &self,
        ctx: &Context,
        user: &User,
        token: Option<&Token>,
    ) -> MetadataResult<Vec<String>> {
        if user.id.is_empty() {
            return Err(ctx.warning(MetadataError::validation(
                "Unable to get user uploads : Missing user",
            )));
        }

        let ids = match token {
            Some(token) => {
                sqlx::query_scalar::<_, String>(
                    "SELECT `id` FROM `uploads` WHERE `user` = ? AND `token` = ?",
                )
                .bind(&user.id)
                .bind(&token.token)
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query_scalar::<_, String>("SELECT `id` FROM `uploads` WHERE `user` = ?")
                    .bind(&user.id)
                    .fetch_all(self.pool())
                    .await
            }
        }
        .map_err(|e| ctx.fail("Unable to get user uploads", e))?;

        Ok(ids)
    }
}

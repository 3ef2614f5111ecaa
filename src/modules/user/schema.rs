use sqlx::{
    any::{Any, AnyArguments},
    prelude::FromRow,
    query::Query,
};

use crate::modules::user::model::{Token, User};

pub const USERS_TABLE: &str = "users";
pub const TOKENS_TABLE: &str = "usersTokens";

/// Column order matches [`UserRow::bind_values`].
pub const USER_COLUMNS: &[&str] = &["id", "login", "name", "email"];

/// Column order matches [`TokenRow::bind_values`].
pub const TOKEN_COLUMNS: &[&str] = &["token", "userId", "creationDate", "comment"];

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub login: String,
    pub name: String,
    pub email: String,
}

impl UserRow {
    pub fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query.bind(&self.id).bind(&self.login).bind(&self.name).bind(&self.email)
    }

    pub fn into_user(self, tokens: Vec<Token>) -> User {
        User { id: self.id, login: self.login, name: self.name, email: self.email, tokens }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        UserRow {
            id: user.id.clone(),
            login: user.login.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// A token as persisted, stamped with the id of the user owning it.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub token: String,
    #[sqlx(rename = "userId")]
    pub user_id: String,
    #[sqlx(rename = "creationDate")]
    pub creation_date: i64,
    pub comment: Option<String>,
}

impl TokenRow {
    pub fn from_token(token: &Token, user_id: &str) -> Self {
        TokenRow {
            token: token.token.clone(),
            user_id: user_id.to_string(),
            creation_date: token.creation_date,
            comment: token.comment.clone(),
        }
    }

    pub fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query.bind(&self.token).bind(&self.user_id).bind(self.creation_date).bind(&self.comment)
    }
}

impl From<TokenRow> for Token {
    fn from(row: TokenRow) -> Self {
        Token { token: row.token, creation_date: row.creation_date, comment: row.comment }
    }
}

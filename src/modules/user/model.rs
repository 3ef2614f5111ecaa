use serde::{Deserialize, Serialize};

use crate::utils;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub name: String,
    pub email: String,
    pub tokens: Vec<Token>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn add_token(&mut self, token: Token) {
        self.tokens.retain(|t| t.token != token.token);
        self.tokens.push(token);
    }

    pub fn token(&self, value: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.token == value)
    }
}

/// An authentication token owned by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token: String,
    pub creation_date: i64,
    pub comment: Option<String>,
}

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), creation_date: utils::unix_now(), comment: None }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_token_replaces_same_value() {
        let mut user = User::new("u1");
        user.add_token(Token::new("t1"));
        user.add_token(Token::new("t1").with_comment("laptop"));
        user.add_token(Token::new("t2"));

        assert_eq!(user.tokens.len(), 2);
        assert_eq!(user.token("t1").and_then(|t| t.comment.as_deref()), Some("laptop"));
    }
}

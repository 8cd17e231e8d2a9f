use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type UserId = i32;

/// The two columns holding authentication tokens. Values are unique within a column.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Web,
    Chrome,
}

impl TokenKind {
    pub const fn column(self) -> &'static str {
        match self {
            TokenKind::Web => "auth_token_for_web",
            TokenKind::Chrome => "auth_token_for_chrome",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError>;

    /// Looks up the owner of `token` in either token column.
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, UserRepoError>;

    async fn token_exists(&self, kind: TokenKind, token: &str) -> Result<bool, UserRepoError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;

    async fn set_token(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token: &str,
    ) -> Result<(), UserRepoError>;

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError>;

    /// Deletes the user together with all of its labels, cards and their associations.
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub auth_token_for_web: String,
    pub auth_token_for_chrome: String,
}

impl User {
    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Web => &self.auth_token_for_web,
            TokenKind::Chrome => &self.auth_token_for_chrome,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub auth_token_for_web: String,
    pub auth_token_for_chrome: String,
}

impl NewUser {
    pub fn new(
        email: String,
        password_hash: String,
        auth_token_for_web: String,
        auth_token_for_chrome: String,
    ) -> NewUser {
        NewUser {
            email,
            password_hash,
            auth_token_for_web,
            auth_token_for_chrome,
        }
    }

    pub fn to_user(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            auth_token_for_web: self.auth_token_for_web,
            auth_token_for_chrome: self.auth_token_for_chrome,
        }
    }
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(UserId),
    #[error("No user with email {0}")]
    EmailNotFound(String),
    #[error("Email {0} is already taken")]
    EmailTaken(String),
    #[error("Token already in use in {0}")]
    TokenTaken(TokenKind),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

use super::SQLxRepo;
use crate::user_repo::{NewUser, TokenKind, User, UserId, UserRepo, UserRepoError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i32,
    email: String,
    password_hash: String,
    auth_token_for_web: String,
    auth_token_for_chrome: String,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
            auth_token_for_web: value.auth_token_for_web,
            auth_token_for_chrome: value.auth_token_for_chrome,
        }
    }
}

/// Maps a unique violation on one of the users table constraints to the matching error.
fn unique_violation(err: &sqlx::Error, email: &str) -> Option<UserRepoError> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    match db_err.constraint() {
        Some("users_email_key") => Some(UserRepoError::EmailTaken(email.to_owned())),
        Some("users_auth_token_for_web_key") => Some(UserRepoError::TokenTaken(TokenKind::Web)),
        Some("users_auth_token_for_chrome_key") => {
            Some(UserRepoError::TokenTaken(TokenKind::Chrome))
        }
        _ => None,
    }
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get user {}", user_id))?;
        user.map(User::from)
            .ok_or(UserRepoError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get user with email {}", email))?;
        user.map(User::from)
            .ok_or_else(|| UserRepoError::EmailNotFound(email.to_owned()))
    }

    #[instrument(skip_all)]
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, UserRepoError> {
        let user: Option<UserEntry> = query_as(
            "SELECT * FROM users WHERE auth_token_for_web = $1 OR auth_token_for_chrome = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("Unable to look up user by token")?;
        Ok(user.map(User::from))
    }

    #[instrument(skip(self, token))]
    async fn token_exists(&self, kind: TokenKind, token: &str) -> Result<bool, UserRepoError> {
        // column names come from TokenKind, never from input
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1)",
            kind.column()
        );
        let exists: bool = query_scalar(&sql)
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Unable to check {} uniqueness", kind))?;
        Ok(exists)
    }

    #[instrument(skip_all, fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let result: Result<i32, sqlx::Error> = query_scalar(
            "INSERT INTO users(email, password_hash, auth_token_for_web, auth_token_for_chrome) VALUES($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.auth_token_for_web)
        .bind(&new_user.auth_token_for_chrome)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(new_user.to_user(id)),
            Err(e) => match unique_violation(&e, &new_user.email) {
                Some(repo_err) => Err(repo_err),
                None => Err(anyhow::Error::new(e)
                    .context(format!("Unable to create user {}", new_user.email))
                    .into()),
            },
        }
    }

    #[instrument(skip(self, token))]
    async fn set_token(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token: &str,
    ) -> Result<(), UserRepoError> {
        let sql = format!("UPDATE users SET {} = $1 WHERE id = $2", kind.column());
        let result = query(&sql)
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 1 => Ok(()),
            Ok(_) => Err(UserRepoError::UserNotFound(user_id)),
            Err(e) => match unique_violation(&e, "") {
                Some(repo_err) => Err(repo_err),
                None => Err(anyhow::Error::new(e)
                    .context(format!("Unable to set {} for user {}", kind, user_id))
                    .into()),
            },
        }
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError> {
        let result = query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update password for {}", user_id))?;
        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(UserRepoError::UserNotFound(user_id))
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        query(
            "DELETE FROM label_cards WHERE label_id IN (SELECT id FROM labels WHERE user_id = $1) OR card_id IN (SELECT id FROM cards WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&mut *db_transaction)
        .await
        .context("Unable to delete label associations")?;
        query("DELETE FROM cards WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *db_transaction)
            .await
            .context("Unable to delete cards")?;
        query("DELETE FROM labels WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *db_transaction)
            .await
            .context("Unable to delete labels")?;
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to delete user {}", user_id))?;

        if result.rows_affected() != 1 {
            // dropping the transaction rolls it back
            return Err(UserRepoError::UserNotFound(user_id));
        }

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;
        Ok(())
    }
}

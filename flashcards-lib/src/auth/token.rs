//! Authentication token generation.
//!
//! Tokens are checked against the store before use, but the check and the write are separate
//! calls. The store rejects duplicates itself, so a token taken in between surfaces as
//! [UserRepoError::TokenTaken] and the generate-and-assign step is repeated.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flashcards_repo::user_repo::{NewUser, TokenKind, User, UserId, UserRepo, UserRepoError};
use rand::Rng;
use tracing::{debug, warn};

/// Encodes to a 20 character token.
pub const TOKEN_BYTES: usize = 15;
/// Used for the last attempt once [MAX_ATTEMPTS] tokens of [TOKEN_BYTES] have collided.
pub const FALLBACK_TOKEN_BYTES: usize = 32;
pub const MAX_ATTEMPTS: usize = 10;
/// How often a write rejected with [UserRepoError::TokenTaken] is retried.
pub const MAX_ASSIGN_ATTEMPTS: usize = 3;

/// `n_bytes` random bytes, URL-safe base64 encoded without padding.
pub fn friendly_token(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    rand::thread_rng().fill(&mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Returns a token for the `kind` column that no user currently holds in either token column.
/// Both columns authenticate, so a token must not be shared across them.
pub async fn generate_unique_token(
    user_repo: &dyn UserRepo,
    kind: TokenKind,
) -> Result<String, UserRepoError> {
    generate_with(user_repo, kind, friendly_token).await
}

async fn generate_with<F>(
    user_repo: &dyn UserRepo,
    kind: TokenKind,
    mut next_token: F,
) -> Result<String, UserRepoError>
where
    F: FnMut(usize) -> String,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let token = next_token(TOKEN_BYTES);
        if !token_in_use(user_repo, &token).await? {
            return Ok(token);
        }
        debug!(%kind, attempt, "Token collision");
    }

    let token = next_token(FALLBACK_TOKEN_BYTES);
    if !token_in_use(user_repo, &token).await? {
        return Ok(token);
    }
    warn!(%kind, "Unable to generate a unique token");
    Err(UserRepoError::TokenTaken(kind))
}

async fn token_in_use(user_repo: &dyn UserRepo, token: &str) -> Result<bool, UserRepoError> {
    for kind in [TokenKind::Web, TokenKind::Chrome] {
        if user_repo.token_exists(kind, token).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Creates a user with freshly generated web and chrome tokens.
pub async fn register_user(
    user_repo: &dyn UserRepo,
    email: String,
    password_hash: String,
) -> Result<User, UserRepoError> {
    let mut attempt = 1;
    loop {
        let new_user = NewUser::new(
            email.clone(),
            password_hash.clone(),
            generate_unique_token(user_repo, TokenKind::Web).await?,
            generate_unique_token(user_repo, TokenKind::Chrome).await?,
        );
        match user_repo.create_user(new_user).await {
            Err(UserRepoError::TokenTaken(kind)) if attempt < MAX_ASSIGN_ATTEMPTS => {
                warn!(%kind, attempt, "Token taken concurrently, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Replaces the user's chrome extension token and returns the new one.
pub async fn regenerate_chrome_token(
    user_repo: &dyn UserRepo,
    user_id: UserId,
) -> Result<String, UserRepoError> {
    let mut attempt = 1;
    loop {
        let token = generate_unique_token(user_repo, TokenKind::Chrome).await?;
        match user_repo.set_token(user_id, TokenKind::Chrome, &token).await {
            Ok(()) => return Ok(token),
            Err(UserRepoError::TokenTaken(kind)) if attempt < MAX_ASSIGN_ATTEMPTS => {
                warn!(%kind, attempt, "Token taken concurrently, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcards_repo::mem_repo::MemRepo;
    use std::collections::HashSet;

    async fn user_holding(repo: &MemRepo, web_token: &str) -> User {
        repo.create_user(NewUser::new(
            format!("{}@example.com", web_token),
            "hash".to_owned(),
            web_token.to_owned(),
            format!("chrome-{}", web_token),
        ))
        .await
        .unwrap()
    }

    #[test]
    fn token_shape() {
        let token = friendly_token(TOKEN_BYTES);
        assert_eq!(20, token.len());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(43, friendly_token(FALLBACK_TOKEN_BYTES).len());
    }

    #[actix_rt::test]
    async fn collision_is_retried() {
        let repo = MemRepo::new();
        user_holding(&repo, "taken").await;

        let mut candidates = vec!["fresh", "taken", "taken"];
        let token = generate_with(&repo, TokenKind::Web, |_| {
            candidates.pop().unwrap().to_owned()
        })
        .await
        .unwrap();
        assert_eq!("fresh", token);
    }

    #[actix_rt::test]
    async fn falls_back_to_larger_tokens() {
        let repo = MemRepo::new();
        user_holding(&repo, "taken").await;

        let mut sizes = Vec::new();
        let token = generate_with(&repo, TokenKind::Web, |n_bytes| {
            sizes.push(n_bytes);
            if n_bytes == FALLBACK_TOKEN_BYTES {
                "large".to_owned()
            } else {
                "taken".to_owned()
            }
        })
        .await
        .unwrap();

        assert_eq!("large", token);
        assert_eq!(MAX_ATTEMPTS + 1, sizes.len());
        assert_eq!(Some(&FALLBACK_TOKEN_BYTES), sizes.last());
    }

    #[actix_rt::test]
    async fn gives_up_when_every_attempt_collides() {
        let repo = MemRepo::new();
        user_holding(&repo, "taken").await;

        let result = generate_with(&repo, TokenKind::Web, |_| "taken".to_owned()).await;
        assert!(matches!(
            result,
            Err(UserRepoError::TokenTaken(TokenKind::Web))
        ));
    }

    #[actix_rt::test]
    async fn collision_checks_both_columns() {
        let repo = MemRepo::new();
        let holder = user_holding(&repo, "shared").await;

        let mut candidates = vec!["fresh chrome", "shared"];
        let token = generate_with(&repo, TokenKind::Chrome, |_| {
            candidates.pop().unwrap().to_owned()
        })
        .await
        .unwrap();
        assert_eq!("fresh chrome", token);

        let mut candidates = vec!["fresh web", holder.auth_token_for_chrome.as_str()];
        let token = generate_with(&repo, TokenKind::Web, |_| {
            candidates.pop().unwrap().to_owned()
        })
        .await
        .unwrap();
        assert_eq!("fresh web", token);
    }

    #[actix_rt::test]
    async fn registered_tokens_are_unique() {
        let repo = MemRepo::new();
        let mut web_tokens = HashSet::new();
        let mut chrome_tokens = HashSet::new();
        for i in 0..20 {
            let user = register_user(&repo, format!("user{}@example.com", i), "hash".into())
                .await
                .unwrap();
            assert_eq!(20, user.auth_token_for_web.len());
            assert!(web_tokens.insert(user.auth_token_for_web));
            assert!(chrome_tokens.insert(user.auth_token_for_chrome));
        }
    }

    #[actix_rt::test]
    async fn chrome_token_is_replaced() {
        let repo = MemRepo::new();
        let user = register_user(&repo, "chrome@example.com".into(), "hash".into())
            .await
            .unwrap();

        let token = regenerate_chrome_token(&repo, user.id).await.unwrap();
        assert_ne!(user.auth_token_for_chrome, token);

        let stored = repo.get_user(user.id).await.unwrap();
        assert_eq!(token, stored.auth_token_for_chrome);
        assert_eq!(user.auth_token_for_web, stored.auth_token_for_web);
    }
}

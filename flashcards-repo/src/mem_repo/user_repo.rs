use super::MemRepo;
use crate::user_repo::UserRepoError::{EmailNotFound, EmailTaken, TokenTaken, UserNotFound};
use crate::user_repo::{NewUser, TokenKind, User, UserId, UserRepo, UserRepoError};
use async_trait::async_trait;

#[async_trait]
impl UserRepo for MemRepo {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| EmailNotFound(email.to_owned()))
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, UserRepoError> {
        let read_guard = self.read_lock()?;

        let user = read_guard
            .users
            .values()
            .find(|u| u.auth_token_for_web == token || u.auth_token_for_chrome == token)
            .cloned();
        Ok(user)
    }

    async fn token_exists(&self, kind: TokenKind, token: &str) -> Result<bool, UserRepoError> {
        let read_guard = self.read_lock()?;

        Ok(read_guard.users.values().any(|u| u.token(kind) == token))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        for user in write_guard.users.values() {
            if user.email == new_user.email {
                return Err(EmailTaken(new_user.email));
            }
            if user.auth_token_for_web == new_user.auth_token_for_web {
                return Err(TokenTaken(TokenKind::Web));
            }
            if user.auth_token_for_chrome == new_user.auth_token_for_chrome {
                return Err(TokenTaken(TokenKind::Chrome));
            }
        }

        write_guard.next_user_id += 1;
        let id = write_guard.next_user_id;

        let user = new_user.to_user(id);
        write_guard.users.insert(id, user.clone());

        Ok(user)
    }

    async fn set_token(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token: &str,
    ) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard
            .users
            .values()
            .any(|u| u.id != user_id && u.token(kind) == token)
        {
            return Err(TokenTaken(kind));
        }

        let user = write_guard
            .users
            .get_mut(&user_id)
            .ok_or(UserNotFound(user_id))?;
        match kind {
            TokenKind::Web => user.auth_token_for_web = token.to_owned(),
            TokenKind::Chrome => user.auth_token_for_chrome = token.to_owned(),
        }
        Ok(())
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        let user = write_guard
            .users
            .get_mut(&user_id)
            .ok_or(UserNotFound(user_id))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        if state.users.remove(&user_id).is_none() {
            return Err(UserNotFound(user_id));
        }

        let labels = &mut state.labels;
        let cards = &mut state.cards;
        state.label_cards.retain(|(label_id, card_id)| {
            let label_owned = labels.get(label_id).map_or(false, |l| l.user_id == user_id);
            let card_owned = cards.get(card_id).map_or(false, |c| c.user_id == user_id);
            !(label_owned || card_owned)
        });
        labels.retain(|_, l| l.user_id != user_id);
        cards.retain(|_, c| c.user_id != user_id);

        Ok(())
    }
}

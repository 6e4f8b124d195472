use anyhow::Context as _;
use uuid::Uuid;

use foodgram_auth_types::password::verify_password;
use foodgram_auth_types::token::{issue_token, validate_token};

use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::error::FoodgramError;

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository, T: AuthTokenRepository> {
    pub users: U,
    pub tokens: T,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<U: UserRepository, T: AuthTokenRepository> LoginUseCase<U, T> {
    /// Returns a signed token whose `jti` is recorded as live.
    pub async fn execute(&self, input: LoginInput) -> Result<String, FoodgramError> {
        let user = self
            .users
            .find_by_email(input.email.trim())
            .await?
            .ok_or(FoodgramError::InvalidCredentials)?;
        let matches = verify_password(&input.password, &user.password_hash)
            .context("verify stored password hash")?;
        if !matches {
            return Err(FoodgramError::InvalidCredentials);
        }

        let jti = Uuid::new_v4();
        let (token, _exp) = issue_token(user.id, jti, self.token_ttl_secs, &self.jwt_secret)
            .context("sign auth token")?;
        self.tokens.create(jti, user.id).await?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(token)
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<T: AuthTokenRepository> {
    pub tokens: T,
}

impl<T: AuthTokenRepository> LogoutUseCase<T> {
    pub async fn execute(&self, jti: Uuid) -> Result<(), FoodgramError> {
        if !self.tokens.delete(jti).await? {
            return Err(FoodgramError::InvalidToken);
        }
        Ok(())
    }
}

// ── Authenticate ─────────────────────────────────────────────────────────────

/// Caller resolved from a live token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
    pub user_id: i32,
    pub jti: Uuid,
}

pub struct AuthenticateUseCase<T: AuthTokenRepository> {
    pub tokens: T,
    pub jwt_secret: String,
}

impl<T: AuthTokenRepository> AuthenticateUseCase<T> {
    pub async fn execute(&self, token: &str) -> Result<Authenticated, FoodgramError> {
        let info =
            validate_token(token, &self.jwt_secret).map_err(|_| FoodgramError::InvalidToken)?;
        if !self.tokens.exists(info.jti).await? {
            return Err(FoodgramError::InvalidToken);
        }
        Ok(Authenticated {
            user_id: info.user_id,
            jti: info.jti,
        })
    }
}

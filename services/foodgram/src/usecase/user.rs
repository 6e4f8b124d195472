use anyhow::Context as _;

use foodgram_auth_types::password::{MIN_PASSWORD_LEN, hash_password, verify_password};
use foodgram_core::error::FieldErrors;
use foodgram_domain::image::DecodedImage;
use foodgram_domain::pagination::PageRequest;

use crate::domain::repository::{MediaFolder, MediaStore, SubscriptionRepository, UserRepository};
use crate::domain::types::{MAX_USER_NAME_LEN, NewUser, User, validate_email, validate_username};
use crate::error::FoodgramError;
use crate::usecase::view::{UserView, user_views};

const REQUIRED: &str = "this field is required";

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub struct RegisterUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> RegisterUserUseCase<R> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, FoodgramError> {
        let mut errors = FieldErrors::new();
        let email = input.email.trim().to_owned();
        let username = input.username.trim().to_owned();

        if email.is_empty() {
            errors.add("email", REQUIRED);
        } else if !validate_email(&email) {
            errors.add("email", "enter a valid email address");
        } else if self.repo.email_taken(&email).await? {
            errors.add("email", "a user with this email already exists");
        }

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if !validate_username(&username) {
            errors.add(
                "username",
                "use at most 150 letters, digits and @/./+/-/_ characters",
            );
        } else if self.repo.username_taken(&username).await? {
            errors.add("username", "a user with this username already exists");
        }

        for (field, value) in [
            ("first_name", &input.first_name),
            ("last_name", &input.last_name),
        ] {
            check_name(&mut errors, field, value);
        }
        check_password(&mut errors, "password", &input.password);
        errors.into_result()?;

        let password_hash = hash_password(&input.password).context("hash password")?;
        self.repo
            .create(&NewUser {
                email,
                username,
                first_name: input.first_name.trim().to_owned(),
                last_name: input.last_name.trim().to_owned(),
                password_hash,
            })
            .await
    }
}

fn check_name(errors: &mut FieldErrors, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > MAX_USER_NAME_LEN {
        errors.add(field, "ensure this field has no more than 150 characters");
    }
}

fn check_password(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, "password must contain at least 8 characters");
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository, S: SubscriptionRepository> {
    pub repo: R,
    pub subscriptions: S,
}

impl<R: UserRepository, S: SubscriptionRepository> GetUserUseCase<R, S> {
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        user_id: i32,
    ) -> Result<UserView, FoodgramError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(FoodgramError::UserNotFound)?;
        let mut views = user_views(&self.subscriptions, viewer, vec![user]).await?;
        views
            .pop()
            .ok_or_else(|| anyhow::anyhow!("user view missing").into())
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository, S: SubscriptionRepository> {
    pub repo: R,
    pub subscriptions: S,
}

impl<R: UserRepository, S: SubscriptionRepository> ListUsersUseCase<R, S> {
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<UserView>, u64), FoodgramError> {
        let (users, count) = self.repo.list(page.clamped()).await?;
        let views = user_views(&self.subscriptions, viewer, users).await?;
        Ok((views, count))
    }
}

// ── SetAvatar ────────────────────────────────────────────────────────────────

pub struct SetAvatarUseCase<R: UserRepository, M: MediaStore> {
    pub repo: R,
    pub media: M,
}

impl<R: UserRepository, M: MediaStore> SetAvatarUseCase<R, M> {
    /// Store the new avatar and return its media path.
    pub async fn execute(&self, user_id: i32, avatar: &str) -> Result<String, FoodgramError> {
        let image = avatar
            .parse::<DecodedImage>()
            .map_err(|e| FoodgramError::field("avatar", e.to_string()))?;
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(FoodgramError::UserNotFound)?;

        let path = self.media.save(MediaFolder::Avatars, &image).await?;
        if let Err(e) = self.repo.set_avatar(user_id, Some(&path)).await {
            self.media.remove(&path).await;
            return Err(e);
        }
        if let Some(old) = user.avatar {
            self.media.remove(&old).await;
        }
        Ok(path)
    }
}

// ── DeleteAvatar ─────────────────────────────────────────────────────────────

pub struct DeleteAvatarUseCase<R: UserRepository, M: MediaStore> {
    pub repo: R,
    pub media: M,
}

impl<R: UserRepository, M: MediaStore> DeleteAvatarUseCase<R, M> {
    pub async fn execute(&self, user_id: i32) -> Result<(), FoodgramError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(FoodgramError::UserNotFound)?;
        if let Some(old) = user.avatar {
            self.repo.set_avatar(user_id, None).await?;
            self.media.remove(&old).await;
        }
        Ok(())
    }
}

// ── SetPassword ──────────────────────────────────────────────────────────────

pub struct SetPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct SetPasswordUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> SetPasswordUseCase<R> {
    pub async fn execute(
        &self,
        user_id: i32,
        input: SetPasswordInput,
    ) -> Result<(), FoodgramError> {
        let mut errors = FieldErrors::new();
        if input.current_password.is_empty() {
            errors.add("current_password", REQUIRED);
        }
        check_password(&mut errors, "new_password", &input.new_password);
        errors.into_result()?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(FoodgramError::UserNotFound)?;
        let matches = verify_password(&input.current_password, &user.password_hash)
            .context("verify stored password hash")?;
        if !matches {
            return Err(FoodgramError::field(
                "current_password",
                "current password is incorrect",
            ));
        }
        let hash = hash_password(&input.new_password).context("hash password")?;
        self.repo.set_password_hash(user_id, &hash).await
    }
}

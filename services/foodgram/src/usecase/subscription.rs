use foodgram_domain::pagination::PageRequest;

use crate::domain::repository::{
    RecipeListRepository, RecipeRepository, SubscriptionRepository, UserRepository,
};
use crate::error::FoodgramError;
use crate::usecase::view::{AuthorView, RecipeReader};

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub reader: RecipeReader<R, U, L, S>,
}

impl<R, U, L, S> SubscribeUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<AuthorView, FoodgramError> {
        let author = self
            .reader
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(FoodgramError::UserNotFound)?;
        if author_id == user_id {
            return Err(FoodgramError::SelfSubscription);
        }
        if !self.reader.subscriptions.add(user_id, author_id).await? {
            return Err(FoodgramError::AlreadySubscribed);
        }
        self.reader
            .author_view(Some(user_id), author, recipes_limit)
            .await
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub users: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> UnsubscribeUseCase<U, S> {
    pub async fn execute(&self, user_id: i32, author_id: i32) -> Result<(), FoodgramError> {
        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(FoodgramError::UserNotFound);
        }
        if !self.subscriptions.remove(user_id, author_id).await? {
            return Err(FoodgramError::NotSubscribed);
        }
        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub reader: RecipeReader<R, U, L, S>,
}

impl<R, U, L, S> ListSubscriptionsUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<(Vec<AuthorView>, u64), FoodgramError> {
        let (authors, count) = self
            .reader
            .subscriptions
            .list_authors(user_id, page.clamped())
            .await?;
        let views = self
            .reader
            .author_views(Some(user_id), authors, recipes_limit)
            .await?;
        Ok((views, count))
    }
}

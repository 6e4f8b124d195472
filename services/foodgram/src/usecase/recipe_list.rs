//! Favorite and shopping-cart toggles.

use crate::domain::repository::{RecipeListRepository, RecipeRepository};
use crate::domain::types::{Recipe, RecipeList};
use crate::error::FoodgramError;

fn already_present(list: RecipeList) -> FoodgramError {
    match list {
        RecipeList::Favorites => FoodgramError::AlreadyFavorited,
        RecipeList::ShoppingCart => FoodgramError::AlreadyInCart,
    }
}

fn not_present(list: RecipeList) -> FoodgramError {
    match list {
        RecipeList::Favorites => FoodgramError::NotFavorited,
        RecipeList::ShoppingCart => FoodgramError::NotInCart,
    }
}

// ── AddToList ────────────────────────────────────────────────────────────────

pub struct AddToListUseCase<R: RecipeRepository, L: RecipeListRepository> {
    pub recipes: R,
    pub lists: L,
}

impl<R: RecipeRepository, L: RecipeListRepository> AddToListUseCase<R, L> {
    /// Returns the recipe for the short response body.
    pub async fn execute(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<Recipe, FoodgramError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(FoodgramError::RecipeNotFound)?;
        if !self.lists.add(list, user_id, recipe_id).await? {
            return Err(already_present(list));
        }
        Ok(recipe)
    }
}

// ── RemoveFromList ───────────────────────────────────────────────────────────

pub struct RemoveFromListUseCase<R: RecipeRepository, L: RecipeListRepository> {
    pub recipes: R,
    pub lists: L,
}

impl<R: RecipeRepository, L: RecipeListRepository> RemoveFromListUseCase<R, L> {
    pub async fn execute(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), FoodgramError> {
        if self.recipes.find_by_id(recipe_id).await?.is_none() {
            return Err(FoodgramError::RecipeNotFound);
        }
        if !self.lists.remove(list, user_id, recipe_id).await? {
            return Err(not_present(list));
        }
        Ok(())
    }
}

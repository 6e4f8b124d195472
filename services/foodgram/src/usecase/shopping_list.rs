use crate::domain::repository::RecipeListRepository;
use crate::domain::shopping_list::{aggregate, render};
use crate::error::FoodgramError;

// ── DownloadShoppingList ─────────────────────────────────────────────────────

pub struct DownloadShoppingListUseCase<L: RecipeListRepository> {
    pub lists: L,
}

impl<L: RecipeListRepository> DownloadShoppingListUseCase<L> {
    /// Plain-text list of merged cart ingredients.
    pub async fn execute(&self, user_id: i32) -> Result<String, FoodgramError> {
        let lines = self.lists.cart_lines(user_id).await?;
        if lines.is_empty() {
            return Err(FoodgramError::CartEmpty);
        }
        Ok(render(&aggregate(lines)))
    }
}

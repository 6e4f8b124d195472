//! Viewer-dependent read models shared by several use cases.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;

use crate::domain::repository::{
    RecipeListRepository, RecipeRepository, SubscriptionRepository, UserRepository,
};
use crate::domain::types::{Recipe, RecipeIngredient, RecipeList, Tag, User};
use crate::error::FoodgramError;

#[derive(Debug, Clone)]
pub struct UserView {
    pub user: User,
    /// Whether the viewer follows this user. Always `false` for anonymous viewers.
    pub is_subscribed: bool,
}

#[derive(Debug, Clone)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub author: UserView,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Followed author with a preview of their recipes.
#[derive(Debug, Clone)]
pub struct AuthorView {
    pub author: UserView,
    pub recipes: Vec<Recipe>,
    pub recipes_count: u64,
}

/// Attach `is_subscribed` for `viewer` to each user, keeping order.
pub async fn user_views<S: SubscriptionRepository>(
    subscriptions: &S,
    viewer: Option<i32>,
    users: Vec<User>,
) -> Result<Vec<UserView>, FoodgramError> {
    let followed: HashSet<i32> = match viewer {
        Some(viewer) if !users.is_empty() => {
            let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
            subscriptions
                .subscribed_among(viewer, &ids)
                .await?
                .into_iter()
                .collect()
        }
        _ => HashSet::new(),
    };
    Ok(users
        .into_iter()
        .map(|user| UserView {
            is_subscribed: followed.contains(&user.id),
            user,
        })
        .collect())
}

/// Repositories needed to render full recipes for a viewer.
pub struct RecipeReader<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub recipes: R,
    pub users: U,
    pub lists: L,
    pub subscriptions: S,
}

impl<R, U, L, S> RecipeReader<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    /// Load links, authors and viewer flags for `rows`, keeping their order.
    pub async fn views(
        &self,
        viewer: Option<i32>,
        rows: Vec<Recipe>,
    ) -> Result<Vec<RecipeView>, FoodgramError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let mut ingredients: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
        for (recipe_id, item) in self.recipes.ingredients_of(&ids).await? {
            ingredients.entry(recipe_id).or_default().push(item);
        }
        let mut tags: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (recipe_id, tag) in self.recipes.tags_of(&ids).await? {
            tags.entry(recipe_id).or_default().push(tag);
        }

        let mut author_ids: Vec<i32> = rows.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self.users.find_by_ids(&author_ids).await?;
        let authors: HashMap<i32, UserView> = user_views(&self.subscriptions, viewer, authors)
            .await?
            .into_iter()
            .map(|view| (view.user.id, view))
            .collect();

        let (favorited, in_cart): (HashSet<i32>, HashSet<i32>) = match viewer {
            Some(viewer) => (
                self.lists
                    .marked(RecipeList::Favorites, viewer, &ids)
                    .await?
                    .into_iter()
                    .collect(),
                self.lists
                    .marked(RecipeList::ShoppingCart, viewer, &ids)
                    .await?
                    .into_iter()
                    .collect(),
            ),
            None => Default::default(),
        };

        rows.into_iter()
            .map(|recipe| -> Result<RecipeView, FoodgramError> {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    anyhow!("author {} of recipe {} missing", recipe.author_id, recipe.id)
                })?;
                Ok(RecipeView {
                    author,
                    tags: tags.remove(&recipe.id).unwrap_or_default(),
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    recipe,
                })
            })
            .collect()
    }

    pub async fn view(
        &self,
        viewer: Option<i32>,
        recipe: Recipe,
    ) -> Result<RecipeView, FoodgramError> {
        self.views(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("recipe view missing").into())
    }

    /// Author view with up to `recipes_limit` newest recipes.
    pub async fn author_view(
        &self,
        viewer: Option<i32>,
        author: User,
        recipes_limit: Option<u64>,
    ) -> Result<AuthorView, FoodgramError> {
        let mut views = self.author_views(viewer, vec![author], recipes_limit).await?;
        views
            .pop()
            .ok_or_else(|| anyhow!("author view missing").into())
    }

    pub async fn author_views(
        &self,
        viewer: Option<i32>,
        authors: Vec<User>,
        recipes_limit: Option<u64>,
    ) -> Result<Vec<AuthorView>, FoodgramError> {
        let authors = user_views(&self.subscriptions, viewer, authors).await?;
        let mut views = Vec::with_capacity(authors.len());
        for author in authors {
            let recipes = self
                .recipes
                .list_by_author(author.user.id, recipes_limit)
                .await?;
            let recipes_count = self.recipes.count_by_author(author.user.id).await?;
            views.push(AuthorView {
                author,
                recipes,
                recipes_count,
            });
        }
        Ok(views)
    }
}

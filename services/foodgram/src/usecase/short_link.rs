use anyhow::anyhow;
use rand::RngExt;

use crate::domain::repository::{RecipeRepository, ShortIdSource, ShortLinkRepository};
use crate::error::FoodgramError;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const SHORT_ID_LEN: usize = 6;
/// Column width of `short_links.short_id`.
pub const MAX_SHORT_ID_LEN: usize = 10;
pub const ATTEMPTS_PER_LEN: usize = 10;

/// Alphanumeric ids drawn from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomShortIds;

impl ShortIdSource for RandomShortIds {
    fn generate(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

// ── GetShortLink ─────────────────────────────────────────────────────────────

pub struct GetShortLinkUseCase<R, L, G>
where
    R: RecipeRepository,
    L: ShortLinkRepository,
    G: ShortIdSource,
{
    pub recipes: R,
    pub links: L,
    pub ids: G,
}

impl<R, L, G> GetShortLinkUseCase<R, L, G>
where
    R: RecipeRepository,
    L: ShortLinkRepository,
    G: ShortIdSource,
{
    /// Existing short id of the recipe, or a freshly assigned one.
    pub async fn execute(&self, recipe_id: i32) -> Result<String, FoodgramError> {
        if self.recipes.find_by_id(recipe_id).await?.is_none() {
            return Err(FoodgramError::RecipeNotFound);
        }
        if let Some(existing) = self.links.find_by_recipe(recipe_id).await? {
            return Ok(existing);
        }

        for len in SHORT_ID_LEN..=MAX_SHORT_ID_LEN {
            for _ in 0..ATTEMPTS_PER_LEN {
                let candidate = self.ids.generate(len);
                if self.links.insert(recipe_id, &candidate).await? {
                    tracing::info!(recipe_id, short_id = %candidate, "short link created");
                    return Ok(candidate);
                }
                // Lost a race for this recipe: the first writer's id wins.
                if let Some(existing) = self.links.find_by_recipe(recipe_id).await? {
                    return Ok(existing);
                }
            }
            tracing::warn!(recipe_id, len, "short id space congested, growing length");
        }
        Err(anyhow!("no free short id for recipe {recipe_id}").into())
    }
}

// ── ResolveShortLink ─────────────────────────────────────────────────────────

pub struct ResolveShortLinkUseCase<L: ShortLinkRepository> {
    pub links: L,
}

impl<L: ShortLinkRepository> ResolveShortLinkUseCase<L> {
    /// Recipe id the short id points at.
    pub async fn execute(&self, short_id: &str) -> Result<i32, FoodgramError> {
        self.links
            .find_recipe(short_id)
            .await?
            .ok_or(FoodgramError::ShortLinkNotFound)
    }
}

//! Read-only ingredient and tag catalogs, plus bulk loading for the admin tool.

use std::collections::HashSet;

use crate::domain::repository::{IngredientRepository, TagRepository};
use crate::domain::types::{Ingredient, NewIngredient, NewTag, Tag};
use crate::error::FoodgramError;

// ── SearchIngredients ────────────────────────────────────────────────────────

pub struct SearchIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> SearchIngredientsUseCase<R> {
    /// Prefix search; a blank query lists every ingredient.
    pub async fn execute(&self, name: Option<&str>) -> Result<Vec<Ingredient>, FoodgramError> {
        let prefix = name.map(str::trim).filter(|n| !n.is_empty());
        self.repo.search(prefix).await
    }
}

// ── GetIngredient ────────────────────────────────────────────────────────────

pub struct GetIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> GetIngredientUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Ingredient, FoodgramError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(FoodgramError::IngredientNotFound)
    }
}

// ── LoadIngredients ──────────────────────────────────────────────────────────

pub struct LoadIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> LoadIngredientsUseCase<R> {
    /// Insert new `(name, unit)` pairs, skipping blanks and duplicates.
    /// Returns the number of rows inserted.
    pub async fn execute(&self, rows: Vec<NewIngredient>) -> Result<u64, FoodgramError> {
        let mut seen = HashSet::new();
        let mut cleaned: Vec<NewIngredient> = Vec::with_capacity(rows.len());
        for row in rows {
            let name = row.name.trim().to_owned();
            let measurement_unit = row.measurement_unit.trim().to_owned();
            if name.is_empty() || measurement_unit.is_empty() {
                continue;
            }
            if seen.insert((name.clone(), measurement_unit.clone())) {
                cleaned.push(NewIngredient {
                    name,
                    measurement_unit,
                });
            }
        }
        if cleaned.is_empty() {
            return Ok(0);
        }
        self.repo.insert_missing(&cleaned).await
    }
}

// ── ListTags ─────────────────────────────────────────────────────────────────

pub struct ListTagsUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> ListTagsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Tag>, FoodgramError> {
        self.repo.list().await
    }
}

// ── GetTag ───────────────────────────────────────────────────────────────────

pub struct GetTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> GetTagUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Tag, FoodgramError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(FoodgramError::TagNotFound)
    }
}

// ── CreateDefaultTags ────────────────────────────────────────────────────────

/// `(name, color, slug)` of the tags every installation starts with.
pub const DEFAULT_TAGS: &[(&str, &str, &str)] = &[
    ("Завтрак", "#E26C2D", "breakfast"),
    ("Обед", "#49B64E", "lunch"),
    ("Ужин", "#8775D2", "dinner"),
    ("Десерт", "#F2B134", "dessert"),
    ("Выпечка", "#C0703B", "baking"),
    ("Салат", "#3FA86D", "salad"),
];

pub struct CreateDefaultTagsUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> CreateDefaultTagsUseCase<R> {
    /// Returns the number of tags inserted; existing slugs are left alone.
    pub async fn execute(&self) -> Result<u64, FoodgramError> {
        let tags: Vec<NewTag> = DEFAULT_TAGS
            .iter()
            .map(|(name, color, slug)| NewTag {
                name: (*name).to_owned(),
                color: (*color).to_owned(),
                slug: (*slug).to_owned(),
            })
            .collect();
        self.repo.insert_missing(&tags).await
    }
}

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, IntoActiveModel as _, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr,
    TransactionError, TransactionTrait,
    sea_query::{Expr, Func, OnConflict, Order, Query, SelectStatement},
};
use uuid::Uuid;

use foodgram_core::sea_ext::starts_with_ci;
use foodgram_domain::pagination::PageRequest;
use foodgram_schema::{
    auth_tokens, favorites, ingredients, recipe_ingredients, recipe_tags, recipes,
    shopping_cart_entries, short_links, subscriptions, tags, users,
};

use crate::domain::repository::{
    AuthTokenRepository, IngredientRepository, RecipeListRepository, RecipeRepository,
    ShortLinkRepository, SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    CartLine, Ingredient, IngredientAmount, NewIngredient, NewRecipe, NewTag, NewUser, Recipe,
    RecipeChanges, RecipeIngredient, RecipeList, RecipeScope, Tag, User,
};
use crate::error::FoodgramError;

/// Rows written by an `ON CONFLICT DO NOTHING` insert.
fn inserted_rows(result: Result<u64, DbErr>) -> Result<u64, DbErr> {
    match result {
        Err(DbErr::RecordNotInserted) => Ok(0),
        other => other,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, FoodgramError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, FoodgramError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, FoodgramError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn email_taken(&self, email: &str) -> Result<bool, FoodgramError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("count users by email")?;
        Ok(count > 0)
    }

    async fn username_taken(&self, username: &str) -> Result<bool, FoodgramError> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await
            .context("count users by username")?;
        Ok(count > 0)
    }

    async fn create(&self, user: &NewUser) -> Result<User, FoodgramError> {
        let result = users::ActiveModel {
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            avatar: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(user_from_model(model)),
            // Lost a race against a concurrent registration.
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    let field = if detail.contains("email") {
                        "email"
                    } else {
                        "username"
                    };
                    Err(FoodgramError::field(
                        field,
                        format!("a user with this {field} already exists"),
                    ))
                }
                _ => Err(anyhow::Error::new(e).context("create user").into()),
            },
        }
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), FoodgramError> {
        let query = users::Entity::find();
        let count = query.clone().count(&self.db).await.context("count users")?;
        let models = query
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok((models.into_iter().map(user_from_model).collect(), count))
    }

    async fn set_avatar(&self, id: i32, avatar: Option<&str>) -> Result<(), FoodgramError> {
        users::ActiveModel {
            id: Set(id),
            avatar: Set(avatar.map(str::to_owned)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user avatar")?;
        Ok(())
    }

    async fn set_password_hash(&self, id: i32, hash: &str) -> Result<(), FoodgramError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user password")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        avatar: model.avatar,
        created_at: model.created_at,
    }
}

// ── Auth token repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthTokenRepository {
    pub db: DatabaseConnection,
}

impl AuthTokenRepository for DbAuthTokenRepository {
    async fn create(&self, jti: Uuid, user_id: i32) -> Result<(), FoodgramError> {
        auth_tokens::ActiveModel {
            jti: Set(jti),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("create auth token")?;
        Ok(())
    }

    async fn exists(&self, jti: Uuid) -> Result<bool, FoodgramError> {
        let model = auth_tokens::Entity::find_by_id(jti)
            .one(&self.db)
            .await
            .context("find auth token")?;
        Ok(model.is_some())
    }

    async fn delete(&self, jti: Uuid) -> Result<bool, FoodgramError> {
        let result = auth_tokens::Entity::delete_by_id(jti)
            .exec(&self.db)
            .await
            .context("delete auth token")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

impl IngredientRepository for DbIngredientRepository {
    async fn search(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, FoodgramError> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = prefix {
            query = query.filter(starts_with_ci(ingredients::Column::Name, prefix));
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::Id)
            .all(&self.db)
            .await
            .context("search ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, FoodgramError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Ingredient>, FoodgramError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find ingredients by ids")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn insert_missing(&self, rows: &[NewIngredient]) -> Result<u64, FoodgramError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let models = rows.iter().map(|row| ingredients::ActiveModel {
            name: Set(row.name.clone()),
            measurement_unit: Set(row.measurement_unit.clone()),
            ..Default::default()
        });
        let inserted = inserted_rows(
            ingredients::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        ingredients::Column::Name,
                        ingredients::Column::MeasurementUnit,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await,
        )
        .context("insert ingredients")?;
        Ok(inserted)
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, FoodgramError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, FoodgramError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, FoodgramError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = tags::Entity::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find tags by ids")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn insert_missing(&self, rows: &[NewTag]) -> Result<u64, FoodgramError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let models = rows.iter().map(|row| tags::ActiveModel {
            name: Set(row.name.clone()),
            color: Set(row.color.clone()),
            slug: Set(row.slug.clone()),
            ..Default::default()
        });
        // No conflict target: a clash on either unique column skips the row.
        let inserted = inserted_rows(
            tags::Entity::insert_many(models)
                .on_conflict(OnConflict::new().do_nothing().to_owned())
                .exec_without_returning(&self.db)
                .await,
        )
        .context("insert tags")?;
        Ok(inserted)
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

/// Compile a resolved filter into a `WHERE` condition on `recipes`.
fn scope_condition(scope: &RecipeScope) -> Condition {
    let mut condition = Condition::all();
    if let Some(author_id) = scope.author {
        condition = condition.add(recipes::Column::AuthorId.eq(author_id));
    }
    if !scope.tags.is_empty() {
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                    .from(recipe_tags::Entity)
                    .inner_join(
                        tags::Entity,
                        Expr::col((tags::Entity, tags::Column::Id))
                            .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                    )
                    .and_where(
                        Expr::expr(Func::lower(Expr::col((tags::Entity, tags::Column::Slug))))
                            .is_in(scope.tags.iter().cloned()),
                    )
                    .to_owned(),
            ),
        );
    }
    if let Some(user_id) = scope.favorited_by {
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(favorites::Column::RecipeId)
                    .from(favorites::Entity)
                    .and_where(Expr::col(favorites::Column::UserId).eq(user_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(user_id) = scope.in_cart_of {
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(shopping_cart_entries::Column::RecipeId)
                    .from(shopping_cart_entries::Entity)
                    .and_where(Expr::col(shopping_cart_entries::Column::UserId).eq(user_id))
                    .to_owned(),
            ),
        );
    }
    condition
}

/// Replace the ingredient rows and, when given, the tag links of a recipe.
async fn replace_links<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    items: &[IngredientAmount],
    tag_ids: Option<&[i32]>,
) -> Result<(), DbErr> {
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if !items.is_empty() {
        recipe_ingredients::Entity::insert_many(items.iter().map(|item| {
            recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(item.ingredient_id),
                amount: Set(item.amount),
                ..Default::default()
            }
        }))
        .exec_without_returning(db)
        .await?;
    }

    if let Some(tag_ids) = tag_ids {
        recipe_tags::Entity::delete_many()
            .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
            .exec(db)
            .await?;
        if !tag_ids.is_empty() {
            recipe_tags::Entity::insert_many(tag_ids.iter().map(|&tag_id| {
                recipe_tags::ActiveModel {
                    recipe_id: Set(recipe_id),
                    tag_id: Set(tag_id),
                }
            }))
            .exec_without_returning(db)
            .await?;
        }
    }
    Ok(())
}

impl RecipeRepository for DbRecipeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, FoodgramError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?;
        Ok(model.map(recipe_from_model))
    }

    async fn list(
        &self,
        scope: &RecipeScope,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), FoodgramError> {
        let query = recipes::Entity::find().filter(scope_condition(scope));
        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let models = query
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list recipes")?;
        Ok((models.into_iter().map(recipe_from_model).collect(), count))
    }

    async fn list_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<Recipe>, FoodgramError> {
        let mut query = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query
            .all(&self.db)
            .await
            .context("list recipes by author")?;
        Ok(models.into_iter().map(recipe_from_model).collect())
    }

    async fn count_by_author(&self, author_id: i32) -> Result<u64, FoodgramError> {
        let count = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .context("count recipes by author")?;
        Ok(count)
    }

    async fn ingredients_of(
        &self,
        recipe_ids: &[i32],
    ) -> Result<Vec<(i32, RecipeIngredient)>, FoodgramError> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .order_by_asc(recipe_ingredients::Column::Id)
            .find_also_related(ingredients::Entity)
            .all(&self.db)
            .await
            .context("list recipe ingredients")?;
        Ok(rows
            .into_iter()
            .filter_map(|(link, ingredient)| {
                ingredient.map(|ingredient| {
                    (
                        link.recipe_id,
                        RecipeIngredient {
                            ingredient: ingredient_from_model(ingredient),
                            amount: link.amount,
                        },
                    )
                })
            })
            .collect())
    }

    async fn tags_of(&self, recipe_ids: &[i32]) -> Result<Vec<(i32, Tag)>, FoodgramError> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = recipe_tags::Entity::find()
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(tags::Entity)
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await
            .context("list recipe tags")?;
        Ok(rows
            .into_iter()
            .filter_map(|(link, tag)| tag.map(|tag| (link.recipe_id, tag_from_model(tag))))
            .collect())
    }

    async fn create(&self, author_id: i32, recipe: &NewRecipe) -> Result<Recipe, FoodgramError> {
        let model = self
            .db
            .transaction::<_, recipes::Model, DbErr>(|txn| {
                let recipe = recipe.clone();
                Box::pin(async move {
                    let model = recipes::ActiveModel {
                        author_id: Set(author_id),
                        name: Set(recipe.name),
                        text: Set(recipe.text),
                        image: Set(recipe.image),
                        cooking_time: Set(recipe.cooking_time),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    replace_links(txn, model.id, &recipe.ingredients, Some(&recipe.tag_ids))
                        .await?;
                    Ok(model)
                })
            })
            .await
            .context("create recipe")?;
        Ok(recipe_from_model(model))
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<Recipe, FoodgramError> {
        let model = self
            .db
            .transaction::<_, recipes::Model, DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    let existing = recipes::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(format!("recipe {id}")))?;
                    let mut recipe = existing.into_active_model();
                    if let Some(name) = changes.name {
                        recipe.name = Set(name);
                    }
                    if let Some(text) = changes.text {
                        recipe.text = Set(text);
                    }
                    if let Some(image) = changes.image {
                        recipe.image = Set(image);
                    }
                    if let Some(cooking_time) = changes.cooking_time {
                        recipe.cooking_time = Set(cooking_time);
                    }
                    let model = recipe.update(txn).await?;
                    replace_links(
                        txn,
                        id,
                        &changes.ingredients,
                        changes.tag_ids.as_deref(),
                    )
                    .await?;
                    Ok(model)
                })
            })
            .await
            .map_err(update_error)?;
        Ok(recipe_from_model(model))
    }

    async fn delete(&self, id: i32) -> Result<bool, FoodgramError> {
        let result = recipes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }
}

/// A recipe deleted concurrently surfaces as not found, everything else is internal.
fn update_error(err: TransactionError<DbErr>) -> FoodgramError {
    match err {
        TransactionError::Transaction(DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) => {
            FoodgramError::RecipeNotFound
        }
        other => anyhow::Error::new(other).context("update recipe").into(),
    }
}

fn recipe_from_model(model: recipes::Model) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        text: model.text,
        image: model.image,
        cooking_time: model.cooking_time,
        created_at: model.created_at,
    }
}

// ── Recipe list repository (favorites, shopping cart) ────────────────────────

#[derive(Clone)]
pub struct DbRecipeListRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct CartLineRow {
    name: String,
    measurement_unit: String,
    amount: i32,
}

/// Ingredient rows of a user's cart in first-encounter order: cart entries
/// by insertion, then ingredient rows by id.
fn cart_lines_statement(user_id: i32) -> SelectStatement {
    Query::select()
        .column((ingredients::Entity, ingredients::Column::Name))
        .column((ingredients::Entity, ingredients::Column::MeasurementUnit))
        .column((recipe_ingredients::Entity, recipe_ingredients::Column::Amount))
        .from(shopping_cart_entries::Entity)
        .inner_join(
            recipe_ingredients::Entity,
            Expr::col((recipe_ingredients::Entity, recipe_ingredients::Column::RecipeId))
                .equals((
                    shopping_cart_entries::Entity,
                    shopping_cart_entries::Column::RecipeId,
                )),
        )
        .inner_join(
            ingredients::Entity,
            Expr::col((ingredients::Entity, ingredients::Column::Id)).equals((
                recipe_ingredients::Entity,
                recipe_ingredients::Column::IngredientId,
            )),
        )
        .and_where(
            Expr::col((
                shopping_cart_entries::Entity,
                shopping_cart_entries::Column::UserId,
            ))
            .eq(user_id),
        )
        .order_by(
            (
                shopping_cart_entries::Entity,
                shopping_cart_entries::Column::CreatedAt,
            ),
            Order::Asc,
        )
        .order_by(
            (
                shopping_cart_entries::Entity,
                shopping_cart_entries::Column::RecipeId,
            ),
            Order::Asc,
        )
        .order_by(
            (recipe_ingredients::Entity, recipe_ingredients::Column::Id),
            Order::Asc,
        )
        .to_owned()
}

impl RecipeListRepository for DbRecipeListRepository {
    async fn add(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, FoodgramError> {
        let now = Utc::now();
        let result = match list {
            RecipeList::Favorites => {
                favorites::Entity::insert(favorites::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(now),
                })
                .on_conflict(
                    OnConflict::columns([favorites::Column::UserId, favorites::Column::RecipeId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
            }
            RecipeList::ShoppingCart => {
                shopping_cart_entries::Entity::insert(shopping_cart_entries::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(now),
                })
                .on_conflict(
                    OnConflict::columns([
                        shopping_cart_entries::Column::UserId,
                        shopping_cart_entries::Column::RecipeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
            }
        };
        let inserted = inserted_rows(result).context("add recipe to list")?;
        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, FoodgramError> {
        let result = match list {
            RecipeList::Favorites => {
                favorites::Entity::delete_by_id((user_id, recipe_id))
                    .exec(&self.db)
                    .await
            }
            RecipeList::ShoppingCart => {
                shopping_cart_entries::Entity::delete_by_id((user_id, recipe_id))
                    .exec(&self.db)
                    .await
            }
        }
        .context("remove recipe from list")?;
        Ok(result.rows_affected > 0)
    }

    async fn marked(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<Vec<i32>, FoodgramError> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i32> = match list {
            RecipeList::Favorites => favorites::Entity::find()
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .all(&self.db)
                .await
                .map(|rows| rows.into_iter().map(|r| r.recipe_id).collect()),
            RecipeList::ShoppingCart => shopping_cart_entries::Entity::find()
                .filter(shopping_cart_entries::Column::UserId.eq(user_id))
                .filter(shopping_cart_entries::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .all(&self.db)
                .await
                .map(|rows| rows.into_iter().map(|r| r.recipe_id).collect()),
        }
        .context("find marked recipes")?;
        Ok(ids)
    }

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, FoodgramError> {
        let statement = cart_lines_statement(user_id);
        let rows = CartLineRow::find_by_statement(self.db.get_database_backend().build(&statement))
            .all(&self.db)
            .await
            .context("list cart ingredient rows")?;
        Ok(rows
            .into_iter()
            .map(|row| CartLine {
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, FoodgramError> {
        let inserted = inserted_rows(
            subscriptions::Entity::insert(subscriptions::ActiveModel {
                user_id: Set(user_id),
                author_id: Set(author_id),
                created_at: Set(Utc::now()),
            })
            .on_conflict(
                OnConflict::columns([
                    subscriptions::Column::UserId,
                    subscriptions::Column::AuthorId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await,
        )
        .context("create subscription")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, FoodgramError> {
        let result = subscriptions::Entity::delete_by_id((user_id, author_id))
            .exec(&self.db)
            .await
            .context("delete subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn subscribed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<Vec<i32>, FoodgramError> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find subscriptions among authors")?;
        Ok(rows.into_iter().map(|r| r.author_id).collect())
    }

    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), FoodgramError> {
        let query = users::Entity::find()
            .join_rev(JoinType::InnerJoin, subscriptions::Relation::Author.def())
            .filter(subscriptions::Column::UserId.eq(user_id));
        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count subscriptions")?;
        let models = query
            .order_by_desc(subscriptions::Column::CreatedAt)
            .order_by_desc(subscriptions::Column::AuthorId)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list subscribed authors")?;
        Ok((models.into_iter().map(user_from_model).collect(), count))
    }
}

// ── Short link repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbShortLinkRepository {
    pub db: DatabaseConnection,
}

impl ShortLinkRepository for DbShortLinkRepository {
    async fn find_by_recipe(&self, recipe_id: i32) -> Result<Option<String>, FoodgramError> {
        let model = short_links::Entity::find_by_id(recipe_id)
            .one(&self.db)
            .await
            .context("find short link by recipe")?;
        Ok(model.map(|m| m.short_id))
    }

    async fn find_recipe(&self, short_id: &str) -> Result<Option<i32>, FoodgramError> {
        let model = short_links::Entity::find()
            .filter(short_links::Column::ShortId.eq(short_id))
            .one(&self.db)
            .await
            .context("find short link by id")?;
        Ok(model.map(|m| m.recipe_id))
    }

    async fn insert(&self, recipe_id: i32, short_id: &str) -> Result<bool, FoodgramError> {
        let inserted = inserted_rows(
            short_links::Entity::insert(short_links::ActiveModel {
                recipe_id: Set(recipe_id),
                short_id: Set(short_id.to_owned()),
                created_at: Set(Utc::now()),
            })
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await,
        )
        .context("insert short link")?;
        Ok(inserted > 0)
    }
}

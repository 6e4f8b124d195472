use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Both tables share one layout: a `(user_id, recipe_id)` primary key plus `created_at`.
fn user_recipe_table(table: impl IntoIden + Clone + 'static) -> TableCreateStatement {
    Table::create()
        .table(table.clone())
        .if_not_exists()
        .col(ColumnDef::new(Pair::UserId).integer().not_null())
        .col(ColumnDef::new(Pair::RecipeId).integer().not_null())
        .col(
            ColumnDef::new(Pair::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .primary_key(Index::create().col(Pair::UserId).col(Pair::RecipeId))
        .foreign_key(
            ForeignKey::create()
                .from(table.clone(), Pair::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, Pair::RecipeId)
                .to(Recipes::Table, Recipes::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(user_recipe_table(Favorites::Table))
            .await?;
        manager
            .create_table(user_recipe_table(ShoppingCartEntries::Table))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShoppingCartEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone)]
enum Favorites {
    Table,
}

#[derive(Iden, Clone)]
enum ShoppingCartEntries {
    Table,
}

#[derive(Iden)]
enum Pair {
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
}

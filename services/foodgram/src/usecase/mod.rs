pub mod auth;
pub mod catalog;
pub mod recipe;
pub mod recipe_list;
pub mod shopping_list;
pub mod short_link;
pub mod subscription;
pub mod user;
pub mod view;

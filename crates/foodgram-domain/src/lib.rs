//! Domain types shared across Foodgram crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers and in handler DTOs.

pub mod image;
pub mod pagination;

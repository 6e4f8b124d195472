//! Auth types shared across Foodgram crates.
//!
//! Provides token issuing/validation, password hashing and
//! `Authorization` header parsing.

pub mod identity;
pub mod password;
pub mod token;

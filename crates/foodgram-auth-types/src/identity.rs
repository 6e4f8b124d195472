//! `Authorization` header parsing.

use http::HeaderMap;
use http::header::AUTHORIZATION;

/// Schemes accepted in front of the token.
const SCHEMES: &[&str] = &["Token", "Bearer"];

/// Outcome of reading the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// No header: anonymous caller.
    Anonymous,
    /// `Token <value>` or `Bearer <value>`.
    Token(&'a str),
    /// Header present but unusable.
    Invalid,
}

pub fn credentials(headers: &HeaderMap) -> Credentials<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Credentials::Anonymous;
    };
    let Ok(value) = value.to_str() else {
        return Credentials::Invalid;
    };
    match value.trim().split_once(' ') {
        Some((scheme, token))
            if SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) && !token.trim().is_empty() =>
        {
            Credentials::Token(token.trim())
        }
        _ => Credentials::Invalid,
    }
}

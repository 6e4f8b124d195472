use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

/// Escape `\`, `%` and `_` so user input matches literally inside `LIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive prefix predicate: `LOWER(col) LIKE '<prefix>%' ESCAPE '\'`.
///
/// The prefix is lower-cased on the Rust side with full Unicode rules, so
/// Cyrillic input behaves the same as ASCII.
pub fn starts_with_ci<C>(col: C, prefix: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

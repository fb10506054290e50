mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;

use axum::Json;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use super::error::ApiError;
use crate::db::Category;

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

/// `{id: type}` the way the front-end expects categories.
pub(crate) fn categories_by_id(categories: &[Category]) -> BTreeMap<i64, String> {
    categories
        .iter()
        .map(|c| (c.id, c.kind.clone()))
        .collect()
}

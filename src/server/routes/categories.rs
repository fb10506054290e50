use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::get_questions_for_category,
        },
        Question,
    },
    server::{
        app::AppState,
        error::{rejected, ApiError, OrApiError},
        pagination::{paginate, Page},
    },
};

use super::{categories_by_id, ApiResponse};

#[derive(Serialize)]
struct CategoriesPage {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesPage> {
    let categories = get_all_categories(&pool)
        .await
        .or_api_error(ApiError::NotFound)?;
    Ok(Json(CategoriesPage {
        success: true,
        categories: categories_by_id(&categories),
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    Page(page): Page,
) -> ApiResponse<CategoryQuestionsPage> {
    let Path(id) = id.map_err(rejected(ApiError::NotFound))?;
    let category = get_category(&pool, id)
        .await
        .or_api_error(ApiError::NotFound)?;
    let questions = get_questions_for_category(&pool, id)
        .await
        .or_api_error(ApiError::NotFound)?;

    let current = paginate(&questions, page);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoryQuestionsPage {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}

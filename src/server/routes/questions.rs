use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::{rejected, ApiError, OrApiError},
        pagination::{paginate, Page},
    },
    telemetry::QUESTIONS_CHANGED,
};

use super::{categories_by_id, ApiResponse};

#[derive(Deserialize)]
struct QuestionForm {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Deserialize)]
struct SearchForm {
    #[serde(rename = "searchTerm", default)]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
    total_questions: i64,
}

async fn questions_page(
    State(pool): State<SqlitePool>,
    Page(page): Page,
) -> ApiResponse<QuestionsPage> {
    let all = questions::get_all_questions(&pool)
        .await
        .or_api_error(ApiError::NotFound)?;
    let categories = get_all_categories(&pool)
        .await
        .or_api_error(ApiError::NotFound)?;

    let current = paginate(&all, page);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(QuestionsPage {
        success: true,
        questions: current.to_vec(),
        total_questions: all.len(),
        // not tied to the request, the front-end just needs something to highlight
        current_category: categories.first().map(|c| c.kind.clone()),
        categories: categories_by_id(&categories),
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = id.map_err(rejected(ApiError::NotFound))?;
    questions::delete_question(&pool, id)
        .await
        .or_api_error(ApiError::Unprocessable)?;

    QUESTIONS_CHANGED.with_label_values(&["deleted"]).inc();
    tracing::info!(id, "Question deleted");
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    form: Result<Json<QuestionForm>, JsonRejection>,
) -> ApiResponse<Created> {
    let Json(form) = form.map_err(rejected(ApiError::MethodNotAllowed))?;
    if form.question.is_empty() || form.answer.is_empty() {
        return Err(ApiError::MethodNotAllowed);
    }

    let id = questions::create_question(
        &pool,
        NewQuestion {
            question: &form.question,
            answer: &form.answer,
            category: form.category,
            difficulty: form.difficulty,
        },
    )
    .await
    .or_api_error(ApiError::MethodNotAllowed)?;
    let total_questions = questions::count_questions(&pool)
        .await
        .or_api_error(ApiError::MethodNotAllowed)?;

    QUESTIONS_CHANGED.with_label_values(&["created"]).inc();
    tracing::info!(id, "Question created");
    Ok(Json(Created {
        success: true,
        created: id,
        total_questions,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    Page(page): Page,
    form: Result<Json<SearchForm>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let Json(form) = form.map_err(rejected(ApiError::Unprocessable))?;
    if form.search_term.is_empty() {
        return Err(ApiError::Unprocessable);
    }

    let found = questions::search_questions(&pool, &form.search_term)
        .await
        .or_api_error(ApiError::NotFound)?;
    let Some(first) = found.first() else {
        return Err(ApiError::NotFound);
    };
    let current = paginate(&found, page);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    // counts the whole table, not the matches
    let total_questions = questions::count_questions(&pool)
        .await
        .or_api_error(ApiError::NotFound)?;

    Ok(Json(SearchResults {
        success: true,
        questions: current.to_vec(),
        total_questions,
        current_category: first.category,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    server::{
        app::AppState,
        error::{rejected, ApiError, OrApiError},
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

/// `quiz_category.id` that stands for "every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRound {
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    /// `None` once every candidate has been asked.
    question: Option<Question>,
}

/// Uniformly picks a candidate whose id is not in `asked`.
///
/// Filtering first keeps the distribution of redrawing on every repeat while always
/// terminating. Returns `None` when nothing is left to ask.
pub(crate) fn pick_next_question<'a, R: Rng + ?Sized>(
    candidates: &'a [Question],
    asked: &HashSet<i64>,
    rng: &mut R,
) -> Option<&'a Question> {
    let remaining: Vec<&Question> = candidates
        .iter()
        .filter(|q| !asked.contains(&q.id))
        .collect();
    remaining.choose(rng).copied()
}

async fn next_question(
    State(pool): State<SqlitePool>,
    round: Result<Json<QuizRound>, JsonRejection>,
) -> ApiResponse<NextQuestion> {
    let Json(round) = round.map_err(rejected(ApiError::BadRequest))?;
    let (Some(previous), Some(category)) = (round.previous_questions, round.quiz_category) else {
        return Err(ApiError::BadRequest);
    };

    let candidates = if category.id == ALL_CATEGORIES {
        questions::get_all_questions(&pool).await
    } else {
        questions::get_questions_for_category(&pool, category.id).await
    }
    .or_api_error(ApiError::BadRequest)?;
    if candidates.is_empty() {
        tracing::debug!(category = category.id, "No questions to draw from");
        return Err(ApiError::BadRequest);
    }

    let asked: HashSet<i64> = previous.into_iter().collect();
    let question = pick_next_question(&candidates, &asked, &mut rand::rng()).cloned();
    match &question {
        Some(q) => {
            // only ids with questions get this far, so the label set stays bounded
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[category.id.to_string().as_str()])
                .inc();
            tracing::debug!(id = q.id, category = category.id, "Serving quiz question");
        }
        None => tracing::info!(category = category.id, "Quiz complete"),
    }

    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}

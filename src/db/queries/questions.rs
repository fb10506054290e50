use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::{QueryError, QueryResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: Option<i64>,
    pub difficulty: Option<i64>,
}

pub struct NewQuestion<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub category: Option<i64>,
    pub difficulty: Option<i64>,
}

pub async fn get_all_questions(pool: &SqlitePool) -> QueryResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> QueryResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

/// Questions whose text contains `term`, ignoring case. Folding is done with Unicode
/// lowercasing in Rust since SQLite's `LOWER` only folds ASCII.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> QueryResult<Vec<Question>> {
    let needle = term.to_lowercase();
    let questions = get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect();
    Ok(questions)
}

pub async fn count_questions(pool: &SqlitePool) -> QueryResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM questions
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn create_question(pool: &SqlitePool, new: NewQuestion<'_>) -> QueryResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(new.question)
    .bind(new.answer)
    .bind(new.category)
    .bind(new.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> QueryResult<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(QueryError::NotFound {
            entity: "question",
            id,
        });
    }
    Ok(())
}

/// Inserts or overwrites questions keeping their ids. Used for seeding.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> QueryResult<()> {
    let mut tx = pool.begin().await?;
    for q in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(q.id)
        .bind(&q.question)
        .bind(&q.answer)
        .bind(q.category)
        .bind(q.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_pool;

    async fn insert(pool: &SqlitePool, text: &str, category: i64) -> i64 {
        create_question(
            pool,
            NewQuestion {
                question: text,
                answer: "answer",
                category: Some(category),
                difficulty: Some(1),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let (_dir, pool) = migrated_pool().await;
        let first = insert(&pool, "first?", 1).await;
        let second = insert(&pool, "second?", 1).await;

        assert!(second > first);
        assert_eq!(count_questions(&pool).await.unwrap(), 2);
        let all = get_all_questions(&pool).await.unwrap();
        assert_eq!(
            all.iter().map(|q| q.id).collect::<Vec<_>>(),
            vec![first, second]
        );
    }

    #[tokio::test]
    async fn search_ignores_case_and_matches_substrings() {
        let (_dir, pool) = migrated_pool().await;
        let id = insert(&pool, "What is the study of living organisms called?", 1).await;
        insert(&pool, "Who painted the Mona Lisa?", 2).await;

        let found = search_questions(&pool, "STUDY of").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let (_dir, pool) = migrated_pool().await;
        insert(&pool, "What is 50% of 10?", 1).await;
        insert(&pool, "Plain question", 1).await;

        assert_eq!(search_questions(&pool, "%").await.unwrap().len(), 1);
        assert!(search_questions(&pool, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_filter_is_exact() {
        let (_dir, pool) = migrated_pool().await;
        insert(&pool, "one", 1).await;
        let id = insert(&pool, "two", 2).await;

        let questions = get_questions_for_category(&pool, 2).await.unwrap();
        assert_eq!(questions.iter().map(|q| q.id).collect::<Vec<_>>(), vec![id]);
        assert!(get_questions_for_category(&pool, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let (_dir, pool) = migrated_pool().await;
        let id = insert(&pool, "doomed", 1).await;

        delete_question(&pool, id).await.unwrap();
        assert!(matches!(
            delete_question(&pool, id).await,
            Err(QueryError::NotFound {
                entity: "question",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let (_dir, pool) = migrated_pool().await;
        let id = insert(&pool, "Which ÉCOLE trained Monet?", 1).await;
        insert(&pool, "Which school did Monet attend?", 1).await;

        let found = search_questions(&pool, "école").await.unwrap();
        assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), vec![id]);
        assert_eq!(search_questions(&pool, "ÉCOLE").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_the_target_row() {
        let (_dir, pool) = migrated_pool().await;
        let keep = insert(&pool, "keep", 1).await;
        let drop = insert(&pool, "drop", 1).await;

        delete_question(&pool, drop).await.unwrap();
        let left = get_all_questions(&pool).await.unwrap();
        assert_eq!(left.iter().map(|q| q.id).collect::<Vec<_>>(), vec![keep]);
    }
}

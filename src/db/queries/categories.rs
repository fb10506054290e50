use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::{QueryError, QueryResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> QueryResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> QueryResult<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(QueryError::NotFound {
        entity: "category",
        id,
    })
}

/// Inserts or overwrites categories keeping their ids. Used for seeding.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> QueryResult<()> {
    let mut tx = pool.begin().await?;
    for category in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, "type") VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET "type" = excluded."type"
            "#,
        )
        .bind(category.id)
        .bind(&category.kind)
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

    fn category(id: i64, kind: &str) -> Category {
        Category {
            id,
            kind: kind.to_owned(),
        }
    }

    #[tokio::test]
    async fn categories_come_back_ordered_by_id() {
        let (_dir, pool) = migrated_pool().await;
        import_categories(&pool, vec![category(3, "Geography"), category(1, "Science")])
            .await
            .unwrap();

        let all = get_all_categories(&pool).await.unwrap();
        assert_eq!(all, vec![category(1, "Science"), category(3, "Geography")]);
    }

    #[tokio::test]
    async fn import_overwrites_existing_type() {
        let (_dir, pool) = migrated_pool().await;
        import_categories(&pool, vec![category(1, "Science")])
            .await
            .unwrap();
        import_categories(&pool, vec![category(1, "Natural Science")])
            .await
            .unwrap();

        assert_eq!(
            get_category(&pool, 1).await.unwrap(),
            category(1, "Natural Science")
        );
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let (_dir, pool) = migrated_pool().await;
        let err = get_category(&pool, 42).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::NotFound {
                entity: "category",
                id: 42
            }
        ));
    }
}

use std::convert::Infallible;

use axum::{extract::FromRequestParts, extract::Query, http::request::Parts};

pub const QUESTIONS_PER_PAGE: usize = 10;
pub const FIRST_PAGE: i64 = 1;

/// The `page` query parameter. Never rejects: a missing, repeated or non-integer value
/// resolves the same way a browser address bar would, first integer wins, otherwise page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(pub i64);

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let page = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => page_from_pairs(&pairs),
            Err(rejection) => {
                tracing::debug!(%rejection, "Unreadable query string, using first page");
                FIRST_PAGE
            }
        };
        Ok(Page(page))
    }
}

fn page_from_pairs(pairs: &[(String, String)]) -> i64 {
    pairs
        .iter()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        .unwrap_or(FIRST_PAGE)
}

/// Returns the 1-indexed `page` of `items`, `QUESTIONS_PER_PAGE` at a time.
///
/// Pages below 1 or past the end are empty.
pub fn paginate<T>(items: &[T], page: i64) -> &[T] {
    let Some(index) = page
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
    else {
        return &[];
    };
    let start = index.saturating_mul(QUESTIONS_PER_PAGE);
    let end = start.saturating_add(QUESTIONS_PER_PAGE).min(items.len());
    items.get(start..end).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn items(n: i64) -> Vec<i64> {
        (1..=n).collect()
    }

    async fn page_of(uri: &str) -> i64 {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        match Page::from_request_parts(&mut parts, &()).await {
            Ok(Page(page)) => page,
            Err(never) => match never {},
        }
    }

    #[test]
    fn pages_are_consecutive_blocks_of_ten() {
        let all = items(25);
        assert_eq!(paginate(&all, 1), &all[0..10]);
        assert_eq!(paginate(&all, 2), &all[10..20]);
        assert_eq!(paginate(&all, 3), &all[20..25]);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let all = items(25);
        assert!(paginate(&all, 4).is_empty());
        assert!(paginate(&all, 100_000).is_empty());
        assert!(paginate(&all, i64::MAX).is_empty());
        assert!(paginate(&all, 0).is_empty());
        assert!(paginate(&all, -3).is_empty());
        assert!(paginate(&all, i64::MIN).is_empty());
    }

    #[test]
    fn empty_input_has_no_pages() {
        assert!(paginate::<i64>(&[], 1).is_empty());
    }

    #[test]
    fn every_item_appears_on_exactly_one_page() {
        let all = items(37);
        let rejoined: Vec<i64> = (1..=4).flat_map(|p| paginate(&all, p).to_vec()).collect();
        assert_eq!(rejoined, all);
    }

    #[tokio::test]
    async fn numeric_pages_are_parsed() {
        assert_eq!(page_of("/questions?page=3").await, 3);
        assert_eq!(page_of("/questions?page=%2012%20").await, 12);
        assert_eq!(page_of("/questions?page=-1").await, -1);
    }

    #[tokio::test]
    async fn garbage_falls_back_to_first_page() {
        assert_eq!(page_of("/questions?page=abc").await, 1);
        assert_eq!(page_of("/questions?page=").await, 1);
        assert_eq!(page_of("/questions").await, 1);
        assert_eq!(page_of("/questions?other=4").await, 1);
    }

    #[tokio::test]
    async fn first_repeated_page_wins() {
        assert_eq!(page_of("/questions?page=2&page=3").await, 2);
        assert_eq!(page_of("/questions?page=x&page=3").await, 1);
    }
}

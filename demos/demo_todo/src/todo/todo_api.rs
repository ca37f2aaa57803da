use crate::todo::todo_state::Todo;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Failures the fake backend can report. Cancellation surfaces here when the
/// caller's token trips while a request is in flight.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ApiError {
    #[error("canceled")]
    Canceled,
    #[error("item not found")]
    NotFound,
}

/// Simulated network latency of the fake backend.
const API_DELAY: Duration = Duration::from_millis(200);

/// In-memory to-do backend behind a simulated network delay.
///
/// Every call checks the caller's cancellation token before and after the
/// delay and reports [`ApiError::Canceled`] when it tripped. Passing an item
/// without an id or title to `add` is misuse and panics; removing an unknown
/// id is an expected domain failure.
#[derive(Debug, Default)]
pub struct TodoApi {
    list: Mutex<Vec<Todo>>,
}

impl TodoApi {
    pub fn new() -> Self {
        TodoApi::default()
    }

    pub async fn list(
        &self,
        filter: &str,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<Todo>, ApiError> {
        info!("API | list, filter: {filter:?}");
        delay(token).await?;
        let filter = filter.to_lowercase();
        let list = self.list.lock().unwrap();
        let matched = if filter.is_empty() {
            list.clone()
        } else {
            list.iter()
                .filter(|todo| todo.title.to_lowercase().contains(&filter))
                .cloned()
                .collect()
        };
        Ok(matched)
    }

    pub async fn add(&self, item: Todo, token: Option<&CancellationToken>) -> Result<(), ApiError> {
        info!("API | add: {:?}", item.title);
        assert!(!item.id.is_empty(), "ID is required");
        assert!(!item.title.is_empty(), "Title is required");
        delay(token).await?;
        self.list.lock().unwrap().push(item);
        Ok(())
    }

    pub async fn remove(&self, id: &str, token: Option<&CancellationToken>) -> Result<(), ApiError> {
        info!("API | remove: {id:?}");
        delay(token).await?;
        let mut list = self.list.lock().unwrap();
        if !list.iter().any(|todo| todo.id == id) {
            return Err(ApiError::NotFound);
        }
        list.retain(|todo| todo.id != id);
        Ok(())
    }
}

async fn delay(token: Option<&CancellationToken>) -> Result<(), ApiError> {
    if token.is_some_and(|t| t.is_cancelled()) {
        return Err(ApiError::Canceled);
    }
    sleep(API_DELAY).await;
    if token.is_some_and(|t| t.is_cancelled()) {
        return Err(ApiError::Canceled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_list_remove_roundtrip() {
        let api = TodoApi::new();
        api.add(Todo::new("1", "Learn Rust"), None).await.unwrap();
        api.add(Todo::new("2", "Ship it"), None).await.unwrap();

        let all = api.list("", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = api.list("rust", None).await.unwrap();
        assert_eq!(filtered, vec![Todo::new("1", "Learn Rust")]);

        api.remove("1", None).await.unwrap();
        assert_eq!(api.list("", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_a_domain_failure() {
        let api = TodoApi::new();
        let result = api.remove("missing", None).await;
        assert_eq!(result, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_cancelled_token_fails_the_call() {
        let api = TodoApi::new();
        let token = CancellationToken::new();
        token.cancel();
        let result = api.list("", Some(&token)).await;
        assert_eq!(result, Err(ApiError::Canceled));
    }

    #[tokio::test]
    #[should_panic(expected = "Title is required")]
    async fn test_add_without_title_is_misuse() {
        let api = TodoApi::new();
        let _ = api.add(Todo::new("1", ""), None).await;
    }
}

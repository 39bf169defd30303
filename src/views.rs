//! Page Views
//!
//! Registers a view when an article is opened. Registration is
//! fire-and-forget: failures are logged, and callers that do not await the
//! handle never see them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::counter::CounterError;

/// Remote page-view counter
#[async_trait]
pub trait ViewService: Send + Sync {
    async fn register_view(&self, slug: &str) -> Result<(), CounterError>;
}

/// Register a view of `slug` in the background
///
/// The handle resolves to the outcome, already logged.
pub fn record_view(
    service: Arc<dyn ViewService>,
    slug: &str,
) -> JoinHandle<Result<(), CounterError>> {
    let slug = slug.to_string();
    tokio::spawn(async move {
        let result = service.register_view(&slug).await;
        match &result {
            Ok(()) => tracing::debug!(slug = %slug, "Page view registered"),
            Err(e) => tracing::warn!(slug = %slug, error = %e, "Page view registration failed"),
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingViews {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ViewService for RecordingViews {
        async fn register_view(&self, slug: &str) -> Result<(), CounterError> {
            self.seen.lock().unwrap().push(slug.to_string());
            if self.fail {
                Err(CounterError::Unavailable)
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_record_view() {
        let views = Arc::new(RecordingViews::default());
        assert!(record_view(views.clone(), "hello-world").await.unwrap().is_ok());
        assert_eq!(*views.seen.lock().unwrap(), vec!["hello-world".to_string()]);
    }

    #[tokio::test]
    async fn test_record_view_reports_failure() {
        let views = Arc::new(RecordingViews {
            fail: true,
            ..Default::default()
        });
        // The task itself completes; the failure is in its output
        let outcome = record_view(views.clone(), "hello-world").await.unwrap();
        assert!(matches!(outcome, Err(CounterError::Unavailable)));
        assert_eq!(views.seen.lock().unwrap().len(), 1);
    }
}

//! Scripted gateway for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{CompletionRequest, Gateway, GatewayError};

const PROVIDER_NAME: &str = "mock";

/// Gateway that replays queued responses and records every request.
///
/// Clones share the same queue and log, so a test can keep a handle while
/// the wizard owns another.
#[derive(Clone, Default)]
pub struct MockGateway {
    responses: Arc<Mutex<VecDeque<Result<String, GatewayError>>>>,
    /// Requests received, in call order
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion
    pub fn respond(&self, text: impl Into<String>) -> &Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failure
    pub fn fail(&self, error: GatewayError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, response: Result<String, GatewayError>) -> &Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }

    pub fn pending_responses(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(GatewayError::malformed(
                    PROVIDER_NAME,
                    "no scripted response left",
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_responses_in_order() {
        let mock = MockGateway::new();
        mock.respond("um").fail(GatewayError::network("mock", "down"));

        let first = mock
            .complete(CompletionRequest::text("m", "p1", 0.2))
            .await
            .unwrap();
        let second = mock.complete(CompletionRequest::text("m", "p2", 0.2)).await;

        assert_eq!(first, "um");
        assert!(matches!(second, Err(GatewayError::NetworkError { .. })));
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.last_request().unwrap().prompt, "p2");
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let mock = MockGateway::new();
        let result = mock.complete(CompletionRequest::text("m", "p", 0.2)).await;
        assert!(matches!(result, Err(GatewayError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockGateway::new();
        let handle = mock.clone();
        mock.respond("x");
        assert_eq!(handle.pending_responses(), 1);
        handle
            .complete(CompletionRequest::text("m", "p", 0.2))
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 1);
    }
}

//! Mock provider for testing
//!
//! Returns configurable responses without making real API calls.
//! With an empty queue it echoes its input, so a chain of mock agents
//! passes the runtime input straight through.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Provider, ProviderDescriptor, ProviderOutput};

/// A call recorded by [`MockProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    pub descriptor: ProviderDescriptor,
    pub input: String,
}

enum Scripted {
    Reply(ProviderOutput),
    Fail(String),
}

/// Mock provider that returns predefined responses
pub struct MockProvider {
    name: String,
    /// Queue of responses to return (FIFO)
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    /// Fixed reply when the queue is empty; `None` echoes the input
    default_response: Option<String>,
    /// Artificial latency per call
    delay: Option<Duration>,
    /// Track all requests made (for assertions)
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with echo behavior
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            default_response: None,
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create with a queue of text responses
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for response in responses {
            provider.queue_response(response.into());
        }
        provider
    }

    /// Report a different name (useful when standing in for a real backend)
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the reply used when the queue is empty
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a response to the queue
    pub fn queue_response(&self, response: impl Into<ProviderOutput>) {
        self.responses
            .lock()
            .push_back(Scripted::Reply(response.into()));
    }

    /// Make the next queued call fail with `message`
    pub fn queue_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Scripted::Fail(message.into()));
    }

    /// Get all requests made to this provider
    pub fn get_requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<MockRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        descriptor: &ProviderDescriptor,
        input: &str,
    ) -> Result<ProviderOutput> {
        self.requests.lock().push(MockRequest {
            descriptor: descriptor.clone(),
            input: input.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.responses.lock().pop_front();
        match scripted {
            Some(Scripted::Reply(output)) => Ok(output),
            Some(Scripted::Fail(message)) => anyhow::bail!(message),
            None => Ok(ProviderOutput::Text(
                self.default_response
                    .clone()
                    .unwrap_or_else(|| input.to_string()),
            )),
        }
    }
}

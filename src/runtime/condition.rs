//! Condition evaluation for conditional nodes

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::provider::{Provider, ProviderDescriptor};

/// Decides whether `condition` holds for `input`
#[async_trait]
pub trait ConditionEvaluator: Send + Sync {
    async fn evaluate(&self, input: &str, condition: &str) -> Result<bool>;
}

/// Asks an LLM to answer only "true" or "false"
pub struct ProviderConditionEvaluator {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderConditionEvaluator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn descriptor(&self, condition: &str) -> ProviderDescriptor {
        let mut descriptor = ProviderDescriptor::new(self.provider.name(), self.model.clone())
            .with_instructions(format!(
                "You are a condition evaluator. Given the context and condition below, \
                 respond with ONLY 'true' or 'false'. Nothing else.\n\nCondition: {}",
                condition
            ));
        descriptor.temperature = Some(0.0);
        descriptor
    }
}

/// A reply counts as true only when it starts with "true" (case-insensitive)
pub fn parse_verdict(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with("true")
}

#[async_trait]
impl ConditionEvaluator for ProviderConditionEvaluator {
    async fn evaluate(&self, input: &str, condition: &str) -> Result<bool> {
        let reply = self
            .provider
            .execute(&self.descriptor(condition), input)
            .await?;
        Ok(parse_verdict(&reply.to_text()))
    }
}

/// Wraps a plain function; handy for tests and deterministic rules
pub struct FnConditionEvaluator<F>(pub F);

#[async_trait]
impl<F> ConditionEvaluator for FnConditionEvaluator<F>
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    async fn evaluate(&self, input: &str, condition: &str) -> Result<bool> {
        Ok((self.0)(input, condition))
    }
}

//! ExecutionEngine - runs a compiled plan as a lazy event stream
//!
//! Nodes run one at a time in plan order. Each node is either skipped
//! (every incoming edge dead) or executed, and its textual output is
//! recorded for downstream aggregation. The first failure emits a single
//! `error` event and ends the stream. Dropping the stream stops the run:
//! nothing executes ahead of what the consumer has pulled.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::condition::{ConditionEvaluator, ProviderConditionEvaluator};
use super::state::RunState;
use crate::ast::NodeType;
use crate::compiler::{CompiledNode, CompiledPayload, ExecutionPlan, KnowledgeBackend};
use crate::config::EngineSettings;
use crate::error::{FlowError, Result};
use crate::event::{Envelope, ExecutionEvent};
use crate::provider::{
    Provider, ProviderDescriptor, ProviderOutput, ProviderRegistry, RetrievalProvider,
    RetrievalSettings,
};

/// Events of one run, in emission order
pub type EventStream = Pin<Box<dyn Stream<Item = ExecutionEvent> + Send>>;

const KB_NOT_CONFIGURED: &str = "Knowledge base not configured";
const KB_NO_SOURCES: &str = "no sources could be loaded";

static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Retrieval collections filled by one run, released when the run's stream
/// is dropped so nothing loaded by one run is visible to another
struct RunCollections {
    scope: String,
    held: Vec<(Arc<dyn RetrievalProvider>, String)>,
}

impl RunCollections {
    fn new(flow_id: &str) -> Self {
        let run = RUN_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            scope: format!("{flow_id}#{run}"),
            held: Vec::new(),
        }
    }

    /// Copy of `settings` whose collection belongs to this run only
    fn scoped(
        &mut self,
        retriever: &Arc<dyn RetrievalProvider>,
        settings: &RetrievalSettings,
    ) -> RetrievalSettings {
        let mut scoped = settings.clone();
        scoped.collection = format!("{}/{}", self.scope, settings.collection);
        self.held.push((Arc::clone(retriever), scoped.collection.clone()));
        scoped
    }
}

impl Drop for RunCollections {
    fn drop(&mut self) {
        for (retriever, collection) in self.held.drain(..) {
            retriever.release(&collection);
        }
    }
}

/// Stateless between runs; clone freely
#[derive(Clone)]
pub struct ExecutionEngine {
    providers: Arc<ProviderRegistry>,
    /// Replaces every registry lookup when set (e.g. `--provider mock`)
    provider_override: Option<Arc<dyn Provider>>,
    /// None: ask the configured condition provider
    condition_evaluator: Option<Arc<dyn ConditionEvaluator>>,
    /// store name ("pg_vector", "in_memory") -> retriever
    retrievers: FxHashMap<String, Arc<dyn RetrievalProvider>>,
    settings: EngineSettings,
}

impl ExecutionEngine {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self {
            providers: Arc::new(providers),
            provider_override: None,
            condition_evaluator: None,
            retrievers: FxHashMap::default(),
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.settings.provider_timeout_ms = millis.max(1);
        self
    }

    pub fn with_provider_override(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider_override = Some(provider);
        self
    }

    pub fn with_condition_evaluator(mut self, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        self.condition_evaluator = Some(evaluator);
        self
    }

    /// Serve knowledge bases compiled for `store` with `retriever`
    pub fn with_retriever(
        mut self,
        store: impl Into<String>,
        retriever: Arc<dyn RetrievalProvider>,
    ) -> Self {
        self.retrievers.insert(store.into(), retriever);
        self
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn timeout(&self) -> Duration {
        self.settings.provider_timeout()
    }

    /// Start a run. Nothing executes until the stream is polled.
    pub fn execute(&self, plan: Arc<ExecutionPlan>, runtime_input: impl Into<String>) -> EventStream {
        let engine = self.clone();
        let runtime_input = runtime_input.into();

        Box::pin(stream! {
            let flow_id = plan.flow_id.as_str();
            let mut state = RunState::new();
            let mut collections = RunCollections::new(flow_id);

            info!(flow_id, nodes = plan.execution_order.len(), "flow execution started");
            yield ExecutionEvent::flow_start(flow_id, &plan.flow_name);

            for node_id in &plan.execution_order {
                if state.should_skip(&plan, node_id) {
                    debug!(flow_id, node_id = %node_id, "node skipped");
                    state.mark_skipped(node_id);
                    yield ExecutionEvent::node_skipped(flow_id, node_id);
                    continue;
                }

                let Some(node) = plan.node(node_id) else {
                    let err = FlowError::NodeExecution {
                        node_id: node_id.clone(),
                        reason: "not present in the plan".to_string(),
                    };
                    warn!(flow_id, node_id = %node_id, error = %err, "flow execution aborted");
                    yield ExecutionEvent::error(flow_id, node_id, err.to_string());
                    return;
                };

                yield ExecutionEvent::node_start(flow_id, node_id, node.node_type.as_str());

                match engine
                    .execute_node(&plan, node, &mut state, &mut collections, &runtime_input)
                    .await {
                    Ok(output) => {
                        state.record_output(node_id, output.to_text());
                        yield ExecutionEvent::node_output(flow_id, node_id, output.into_value());
                        yield ExecutionEvent::node_complete(flow_id, node_id);
                    }
                    Err(err) => {
                        warn!(flow_id, node_id = %node_id, error = %err, "flow execution aborted");
                        yield ExecutionEvent::error(flow_id, node_id, err.to_string());
                        return;
                    }
                }
            }

            let final_output = plan
                .execution_order
                .last()
                .and_then(|id| state.output(id))
                .unwrap_or_default()
                .to_string();

            info!(flow_id, "flow execution completed");
            yield ExecutionEvent::flow_complete(flow_id, final_output);
        })
    }

    async fn execute_node(
        &self,
        plan: &ExecutionPlan,
        node: &CompiledNode,
        state: &mut RunState,
        collections: &mut RunCollections,
        runtime_input: &str,
    ) -> Result<ProviderOutput> {
        let node_id = node.node_id.as_str();
        debug!(node_id, node_type = %node.node_type, "executing node");

        match &node.payload {
            CompiledPayload::Input { default_value, .. } => {
                let value = if runtime_input.is_empty() {
                    default_value.clone()
                } else {
                    runtime_input.to_string()
                };
                Ok(ProviderOutput::Text(value))
            }

            CompiledPayload::Output { .. } => {
                Ok(ProviderOutput::Text(state.aggregate_upstream(plan, node_id)))
            }

            CompiledPayload::Agent { descriptor } | CompiledPayload::WebSearch { descriptor, .. } => {
                let input = state.aggregate_upstream(plan, node_id);
                self.call_provider(node_id, descriptor, &input).await
            }

            CompiledPayload::Integration { service, descriptor } => {
                let input = state.aggregate_upstream(plan, node_id);
                let output = self.call_provider(node_id, descriptor, &input).await?;
                Ok(Envelope::from_output(service.as_str(), output).into())
            }

            CompiledPayload::Conditional { condition, .. } => {
                let input = state.aggregate_upstream(plan, node_id);
                let passed = self.evaluate_condition(node_id, &input, condition).await?;
                state.record_decision(node_id, if passed { "true" } else { "false" });
                debug!(node_id, passed, "condition evaluated");
                Ok(ProviderOutput::Text(input))
            }

            CompiledPayload::KnowledgeBase {
                settings,
                backend,
                unavailable,
            } => {
                let input = state.aggregate_upstream(plan, node_id);
                self.query_knowledge_base(
                    node_id,
                    settings,
                    backend.as_ref(),
                    unavailable.as_deref(),
                    collections,
                    &input,
                )
                .await
            }

            CompiledPayload::Raw { .. } => match node.node_type {
                NodeType::Agent | NodeType::Tool => Err(FlowError::NodeExecution {
                    node_id: node_id.to_string(),
                    reason: format!("Node '{}' has no compiled agent", node_id),
                }),
                other => Ok(ProviderOutput::Text(format!(
                    "[Unhandled node type: {}]",
                    other
                ))),
            },
        }
    }

    fn resolve_provider(&self, key: &str) -> Result<Arc<dyn Provider>> {
        if let Some(provider) = &self.provider_override {
            return Ok(Arc::clone(provider));
        }
        self.providers
            .get(key)
            .ok_or_else(|| FlowError::ProviderNotConfigured {
                provider: key.to_string(),
            })
    }

    fn timeout_error(&self, provider: &str) -> FlowError {
        FlowError::ProviderTimeout {
            provider: provider.to_string(),
            timeout_ms: self.timeout().as_millis() as u64,
        }
    }

    async fn call_provider(
        &self,
        node_id: &str,
        descriptor: &ProviderDescriptor,
        input: &str,
    ) -> Result<ProviderOutput> {
        let provider = self.resolve_provider(&descriptor.provider)?;
        debug!(node_id, provider = provider.name(), model = %descriptor.model, "calling provider");

        match tokio::time::timeout(self.timeout(), provider.execute(descriptor, input)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(FlowError::NodeExecution {
                node_id: node_id.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(self.timeout_error(&descriptor.provider)),
        }
    }

    async fn evaluate_condition(&self, node_id: &str, input: &str, condition: &str) -> Result<bool> {
        let evaluator: Arc<dyn ConditionEvaluator> = match &self.condition_evaluator {
            Some(evaluator) => Arc::clone(evaluator),
            None => {
                let provider = self.resolve_provider(&self.settings.condition_provider)?;
                Arc::new(ProviderConditionEvaluator::new(
                    provider,
                    self.settings.condition_model.clone(),
                ))
            }
        };

        match tokio::time::timeout(self.timeout(), evaluator.evaluate(input, condition)).await {
            Ok(Ok(passed)) => Ok(passed),
            Ok(Err(e)) => Err(FlowError::NodeExecution {
                node_id: node_id.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(self.timeout_error(&self.settings.condition_provider)),
        }
    }

    /// Degraded knowledge bases answer with a placeholder instead of failing
    async fn query_knowledge_base(
        &self,
        node_id: &str,
        settings: &RetrievalSettings,
        backend: Option<&KnowledgeBackend>,
        unavailable: Option<&str>,
        collections: &mut RunCollections,
        input: &str,
    ) -> Result<ProviderOutput> {
        let Some(backend) = backend else {
            return Ok(kb_placeholder(unavailable.unwrap_or(KB_NOT_CONFIGURED)));
        };
        let Some(retriever) = self.retrievers.get(backend.store_name()) else {
            return Ok(kb_placeholder(&format!(
                "no retriever registered for '{}'",
                backend.store_name()
            )));
        };

        let settings = collections.scoped(retriever, settings);
        let mut loaded = 0;
        for source in &settings.sources {
            match retriever.load_source(&settings, source).await {
                Ok(()) => loaded += 1,
                Err(e) => {
                    warn!(node_id, source = %source, error = %e, "knowledge source failed to load")
                }
            }
        }
        if loaded == 0 {
            return Ok(kb_placeholder(KB_NO_SOURCES));
        }

        match tokio::time::timeout(self.timeout(), retriever.query(&settings, input)).await {
            Ok(Ok(passages)) => Ok(ProviderOutput::Text(passages)),
            Ok(Err(e)) => Err(FlowError::NodeExecution {
                node_id: node_id.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(self.timeout_error(backend.store_name())),
        }
    }
}

fn kb_placeholder(reason: &str) -> ProviderOutput {
    ProviderOutput::Text(format!("[Knowledge Base unavailable: {}]", reason))
}

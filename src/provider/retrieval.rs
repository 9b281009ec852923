//! Retrieval providers for knowledge-base nodes
//!
//! A knowledge-base node loads its sources into a named collection, then
//! answers the aggregated upstream text with the best-matching passages.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Passages returned per query
const TOP_K: usize = 3;

/// Compiled retrieval settings for one knowledge-base node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Collection the sources are loaded into
    pub collection: String,
    pub kb_type: String,
    pub sources: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Load one source into `settings.collection`. Idempotent per source.
    async fn load_source(&self, settings: &RetrievalSettings, source: &str) -> Result<()>;

    /// Answer `input` from the collection
    async fn query(&self, settings: &RetrievalSettings, input: &str) -> Result<String>;

    /// Drop everything loaded into `collection`
    fn release(&self, _collection: &str) {}
}

#[derive(Debug, Clone)]
struct Chunk {
    source: Arc<str>,
    text: String,
}

#[derive(Debug, Default)]
struct Collection {
    loaded: FxHashSet<String>,
    chunks: Vec<Chunk>,
}

/// Process-local retriever: text sources from disk, term-overlap scoring
#[derive(Debug, Default)]
pub struct InMemoryRetriever {
    collections: RwLock<FxHashMap<String, Collection>>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add text directly, bypassing the filesystem
    pub fn add_text(&self, settings: &RetrievalSettings, source: &str, text: &str) {
        let source: Arc<str> = Arc::from(source);
        let chunks = chunk_text(text, settings.chunk_size, settings.chunk_overlap)
            .into_iter()
            .map(|text| Chunk {
                source: Arc::clone(&source),
                text,
            });

        let mut collections = self.collections.write();
        let collection = collections.entry(settings.collection.clone()).or_default();
        collection.loaded.insert(source.to_string());
        collection.chunks.extend(chunks);
    }

    /// Number of chunks held for `collection`
    pub fn chunk_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |c| c.chunks.len())
    }

    /// Number of collections currently held
    pub fn collection_count(&self) -> usize {
        self.collections.read().len()
    }

    fn is_loaded(&self, collection: &str, source: &str) -> bool {
        self.collections
            .read()
            .get(collection)
            .is_some_and(|c| c.loaded.contains(source))
    }
}

#[async_trait]
impl RetrievalProvider for InMemoryRetriever {
    async fn load_source(&self, settings: &RetrievalSettings, source: &str) -> Result<()> {
        if self.is_loaded(&settings.collection, source) {
            return Ok(());
        }

        let text = tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read knowledge source '{}'", source))?;

        self.add_text(settings, source, &text);
        tracing::debug!(
            collection = %settings.collection,
            source,
            chunks = self.chunk_count(&settings.collection),
            "knowledge source loaded"
        );
        Ok(())
    }

    async fn query(&self, settings: &RetrievalSettings, input: &str) -> Result<String> {
        let collections = self.collections.read();
        let collection = collections
            .get(&settings.collection)
            .filter(|c| !c.loaded.is_empty())
            .with_context(|| {
                format!(
                    "Knowledge base '{}' has no loaded sources",
                    settings.collection
                )
            })?;

        let terms = tokenize(input);
        let mut scored: Vec<(usize, usize)> = collection
            .chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let words = tokenize(&chunk.text);
                (terms.intersection(&words).count(), idx)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        // highest score first, earlier chunk wins ties
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        if scored.is_empty() {
            return Ok("No relevant passages found in the knowledge base.".to_string());
        }

        let passages: Vec<String> = scored
            .iter()
            .take(TOP_K)
            .map(|(_, idx)| {
                let chunk = &collection.chunks[*idx];
                format!("[{}]\n{}", chunk.source, chunk.text.trim())
            })
            .collect();

        Ok(passages.join("\n\n---\n\n"))
    }

    fn release(&self, collection: &str) {
        self.collections.write().remove(collection);
    }
}

/// Split into windows of `size` chars, each starting `size - overlap` after the last
fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if size == 0 || chars.len() <= size {
        return vec![text.to_string()];
    }

    let step = if overlap < size { size - overlap } else { size };
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Lowercased alphanumeric words of 3+ chars
fn tokenize(text: &str) -> FxHashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

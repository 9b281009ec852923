//! Utilities Module - shared infrastructure
//!
//! - `constants`: Centralized timeouts and limits

pub mod constants;

// Re-export public types
pub use constants::{
    CONDITION_MODEL, CONNECT_TIMEOUT, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, INFER_TIMEOUT,
    PROVIDER_TIMEOUT, REDIRECT_LIMIT, WEB_SEARCH_MODEL,
};

//! The fetch capability the resolver is driven through.
//!
//! Transport, timeouts and retries belong to the [`Fetch`] implementation;
//! the resolver only sees bytes or a [`FetchError`].
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryFetch`] | Tests, fixtures, documents already held in memory |
//! | your own | HTTP gateways, IPFS, caches |

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Document;

/// Errors a [`Fetch`] implementation reports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Nothing is published at the URI.
    #[error("not found: {0}")]
    NotFound(String),

    /// The transport failed; the document may exist.
    #[error("transport error fetching {uri}: {reason}")]
    Transport { uri: String, reason: String },
}

/// Retrieves the raw bytes of the document at an `rss3://` URI.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

/// Documents held in a map keyed by URI.
#[derive(Default)]
pub struct MemoryFetch {
    docs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bytes` at `uri`, replacing what was there.
    pub fn insert(&self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.into(), bytes.into());
    }

    /// Publish a document at its own identifier.
    pub fn insert_document(&self, doc: &Document) -> Result<(), serde_json::Error> {
        let bytes = serde_json::to_vec(doc)?;
        self.insert(doc.identifier(), bytes);
        Ok(())
    }

    pub fn remove(&self, uri: &str) -> Option<Vec<u8>> {
        self.docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri)
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Fetch for MemoryFetch {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        self.docs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(uri.to_string()))
    }
}

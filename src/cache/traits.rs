//! Core traits and types for the local image cache.

use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::task::Completion;

/// Errors raised by the persistence layer itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Cache database error: {0}")]
  Database(#[from] rusqlite::Error),
  #[error("Corrupt cache entry: {0}")]
  Corrupt(String),
  #[error("Cache store worker has shut down")]
  Closed,
}

pub type RetrievalResult = Result<Option<Vec<u8>>, StoreError>;
pub type InsertionResult = Result<(), StoreError>;

/// Persisted URL -> bytes mapping.
///
/// Implementations serialize their own work and always complete
/// asynchronously, so callers on any thread never block and need no locking.
pub trait BeerImageDataStore: Send + Sync {
  /// Stored bytes for `url`, `None` when nothing is stored.
  fn retrieve(&self, url: &Url, completion: Completion<RetrievalResult>);

  /// Store `data` under `url`, replacing what was there.
  fn insert(&self, data: Vec<u8>, url: &Url, completion: Completion<InsertionResult>);
}

impl<T: BeerImageDataStore + ?Sized> BeerImageDataStore for Arc<T> {
  fn retrieve(&self, url: &Url, completion: Completion<RetrievalResult>) {
    (**self).retrieve(url, completion)
  }

  fn insert(&self, data: Vec<u8>, url: &Url, completion: Completion<InsertionResult>) {
    (**self).insert(data, url, completion)
  }
}

/// How inserts treat entries for other URLs.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheDiscipline {
  /// One independent entry per URL
  #[default]
  PerUrl,
  /// A single global entry: every insert evicts everything else
  SingleSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageCacheError {
  #[error("Failed to save image data to the local store")]
  Failed,
}

pub type SaveResult = Result<(), ImageCacheError>;

/// Write side of the local image cache.
pub trait BeerImageDataCache: Send + Sync {
  fn save(&self, data: Vec<u8>, url: &Url, completion: Completion<SaveResult>);
}

impl<T: BeerImageDataCache + ?Sized> BeerImageDataCache for Arc<T> {
  fn save(&self, data: Vec<u8>, url: &Url, completion: Completion<SaveResult>) {
    (**self).save(data, url, completion)
  }
}

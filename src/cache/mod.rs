//! Local image cache for offline support.
//!
//! This module provides:
//! - A persisted URL -> bytes store with its own serial worker
//! - A loader that reads images from that store and writes them back
//! - A switch between per-URL entries and a single global slot

mod local;
mod storage;
mod traits;

pub use local::LocalBeerImageDataLoader;
pub use storage::{CachedImage, SqliteImageDataStore};
pub use traits::{
  BeerImageDataCache, BeerImageDataStore, CacheDiscipline, ImageCacheError, InsertionResult,
  RetrievalResult, SaveResult, StoreError,
};

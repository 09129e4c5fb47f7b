use std::sync::Arc;
use url::Url;

use super::traits::{BeerImageDataCache, BeerImageDataStore, ImageCacheError, SaveResult};
use crate::beer::{BeerImageDataLoader, ImageDataError, ImageDataResult};
use crate::task::{Completion, CompletionSlot, LoaderTask, SuppressingTask};

/// Reads images from, and saves images to, a local store.
///
/// Store errors never leak out: reads report `Failed` or `NotFound`, writes
/// report `Failed`. Nothing is delivered once the loader has been dropped.
pub struct LocalBeerImageDataLoader<S: BeerImageDataStore> {
  store: S,
  alive: Arc<()>,
}

impl<S: BeerImageDataStore> LocalBeerImageDataLoader<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      alive: Arc::new(()),
    }
  }
}

impl<S: BeerImageDataStore> BeerImageDataLoader for LocalBeerImageDataLoader<S> {
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    let slot = Arc::new(CompletionSlot::new(completion));
    let alive = Arc::downgrade(&self.alive);
    let delivery = slot.clone();
    let requested = url.clone();

    self.store.retrieve(
      url,
      Box::new(move |result| {
        if alive.upgrade().is_none() {
          return;
        }

        let outcome = match result {
          Ok(Some(data)) if !data.is_empty() => {
            tracing::debug!(url = %requested, "Image cache hit");
            Ok(data)
          }
          // An empty blob is never a usable image.
          Ok(_) => {
            tracing::debug!(url = %requested, "Image cache miss");
            Err(ImageDataError::NotFound)
          }
          Err(e) => {
            tracing::warn!(url = %requested, "Image cache read failed: {}", e);
            Err(ImageDataError::Failed)
          }
        };
        delivery.complete(outcome);
      }),
    );

    // Store reads cannot be aborted; cancelling only suppresses delivery.
    Box::new(SuppressingTask::new(slot))
  }
}

impl<S: BeerImageDataStore> BeerImageDataCache for LocalBeerImageDataLoader<S> {
  fn save(&self, data: Vec<u8>, url: &Url, completion: Completion<SaveResult>) {
    let alive = Arc::downgrade(&self.alive);

    self.store.insert(
      data,
      url,
      Box::new(move |result| {
        if alive.upgrade().is_none() {
          return;
        }

        completion(result.map_err(|e| {
          tracing::warn!("Image cache write failed: {}", e);
          ImageCacheError::Failed
        }));
      }),
    );
  }
}

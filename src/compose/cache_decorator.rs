use std::sync::Arc;
use url::Url;

use crate::beer::{BeerImageDataLoader, ImageDataResult};
use crate::cache::BeerImageDataCache;
use crate::task::{Completion, LoaderTask};

/// Image loader with write-through caching.
///
/// This wraps another loader and provides the same API, but every
/// successfully loaded image is also handed to `cache`. The save outcome never
/// reaches the caller; failures are only logged.
pub struct BeerImageDataLoaderCacheDecorator<L, C> {
  decoratee: L,
  cache: Arc<C>,
  alive: Arc<()>,
}

impl<L, C> BeerImageDataLoaderCacheDecorator<L, C>
where
  L: BeerImageDataLoader,
  C: BeerImageDataCache + 'static,
{
  pub fn new(decoratee: L, cache: C) -> Self {
    Self {
      decoratee,
      cache: Arc::new(cache),
      alive: Arc::new(()),
    }
  }
}

impl<L, C> BeerImageDataLoader for BeerImageDataLoaderCacheDecorator<L, C>
where
  L: BeerImageDataLoader,
  C: BeerImageDataCache + 'static,
{
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    let cache = self.cache.clone();
    let alive = Arc::downgrade(&self.alive);
    let requested = url.clone();

    self.decoratee.load_image_data(
      url,
      Box::new(move |result| {
        if let Ok(data) = &result {
          // Skip the write if the decorator went away mid-load.
          if alive.upgrade().is_some() {
            save_ignoring_result(&*cache, data.clone(), requested);
          }
        }
        completion(result);
      }),
    )
  }
}

fn save_ignoring_result<C: BeerImageDataCache>(cache: &C, data: Vec<u8>, url: Url) {
  cache.save(
    data,
    &url.clone(),
    Box::new(move |result| {
      if let Err(e) = result {
        tracing::warn!(%url, "Ignoring image cache write failure: {}", e);
      }
    }),
  );
}

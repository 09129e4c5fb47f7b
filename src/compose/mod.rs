//! Composition of the loading pipeline.
//!
//! The image pipeline reads the local cache first and only goes to the network
//! on a miss; whatever the network returns is written back to the cache. Every
//! callback ends up on the main queue:
//!
//! ```text
//! dispatch(fallback(local, cache_decorator(remote, local)))
//! ```

mod cache_decorator;
mod fallback;
mod main_queue;

pub use cache_decorator::BeerImageDataLoaderCacheDecorator;
pub use fallback::BeerImageDataLoaderWithFallbackComposite;
pub use main_queue::{MainLoop, MainQueue, MainQueueDispatchDecorator};

use url::Url;

use crate::beer::{RemoteBeerImageDataLoader, RemoteBeerListLoader};
use crate::cache::{BeerImageDataStore, LocalBeerImageDataLoader};
use crate::http::HttpClient;

pub type ComposedImageLoader<C, S> = MainQueueDispatchDecorator<
  BeerImageDataLoaderWithFallbackComposite<
    LocalBeerImageDataLoader<S>,
    BeerImageDataLoaderCacheDecorator<RemoteBeerImageDataLoader<C>, LocalBeerImageDataLoader<S>>,
  >,
>;

pub type ComposedListLoader<C> = MainQueueDispatchDecorator<RemoteBeerListLoader<C>>;

/// Cache-first image loader that writes remote hits back to `store`.
pub fn image_loader<C, S>(client: C, store: S, queue: MainQueue) -> ComposedImageLoader<C, S>
where
  C: HttpClient + 'static,
  S: BeerImageDataStore + Clone + 'static,
{
  let local = LocalBeerImageDataLoader::new(store.clone());
  let remote = BeerImageDataLoaderCacheDecorator::new(
    RemoteBeerImageDataLoader::new(client),
    LocalBeerImageDataLoader::new(store),
  );

  MainQueueDispatchDecorator::new(
    BeerImageDataLoaderWithFallbackComposite::new(local, remote),
    queue,
  )
}

pub fn list_loader<C: HttpClient>(url: Url, client: C, queue: MainQueue) -> ComposedListLoader<C> {
  MainQueueDispatchDecorator::new(RemoteBeerListLoader::new(url, client), queue)
}

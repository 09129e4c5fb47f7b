//! Beer list and image loading contracts, plus their remote implementations.

pub mod api_types;
mod image;
mod loader;
pub mod types;

pub use image::RemoteBeerImageDataLoader;
pub use loader::RemoteBeerListLoader;
pub use types::Beer;

use std::sync::Arc;
use url::Url;

use crate::http::HttpClientError;
use crate::task::{Completion, LoaderTask};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeerListError {
  /// Covers transport failures as well as bad status codes and bodies.
  #[error("Invalid data received from the beer list endpoint")]
  InvalidData,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageDataError {
  #[error("Invalid image data")]
  InvalidData,
  #[error("Local image store failed")]
  Failed,
  #[error("Image not found in local store")]
  NotFound,
  #[error(transparent)]
  Http(#[from] HttpClientError),
}

pub type BeerListResult = Result<Vec<Beer>, BeerListError>;
pub type ImageDataResult = Result<Vec<u8>, ImageDataError>;

/// Loads the full beer list.
pub trait BeerListLoader: Send + Sync {
  fn load(&self, completion: Completion<BeerListResult>);
}

/// Loads image bytes for a URL.
///
/// This is the single seam every image decorator is written against.
pub trait BeerImageDataLoader: Send + Sync {
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask>;
}

impl<T: BeerListLoader + ?Sized> BeerListLoader for Arc<T> {
  fn load(&self, completion: Completion<BeerListResult>) {
    (**self).load(completion)
  }
}

impl<T: BeerImageDataLoader + ?Sized> BeerImageDataLoader for Arc<T> {
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    (**self).load_image_data(url, completion)
  }
}

use std::sync::Arc;
use url::Url;

use super::{BeerImageDataLoader, ImageDataError, ImageDataResult};
use crate::http::{HttpClient, HttpResult};
use crate::task::{Completion, CompletionSlot, LoaderTask};

/// Fetches raw image bytes over HTTP.
pub struct RemoteBeerImageDataLoader<C: HttpClient> {
  client: C,
  alive: Arc<()>,
}

impl<C: HttpClient> RemoteBeerImageDataLoader<C> {
  pub fn new(client: C) -> Self {
    Self {
      client,
      alive: Arc::new(()),
    }
  }
}

/// Cancels the transport request and stops any late response from getting through.
struct HttpClientTaskWrapper {
  slot: Arc<CompletionSlot<ImageDataResult>>,
  wrapped: Box<dyn LoaderTask>,
}

impl LoaderTask for HttpClientTaskWrapper {
  fn cancel(&self) {
    if self.slot.prevent_further_completions() {
      self.wrapped.cancel();
    }
  }
}

fn map_image_response(result: HttpResult) -> ImageDataResult {
  match result {
    Ok(response) if response.is_ok() && !response.body.is_empty() => Ok(response.body),
    Ok(response) => {
      tracing::debug!(
        status = response.status,
        bytes = response.body.len(),
        "Unusable image response"
      );
      Err(ImageDataError::InvalidData)
    }
    Err(e) => Err(ImageDataError::Http(e)),
  }
}

impl<C: HttpClient> BeerImageDataLoader for RemoteBeerImageDataLoader<C> {
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    let slot = Arc::new(CompletionSlot::new(completion));
    let alive = Arc::downgrade(&self.alive);

    let delivery = slot.clone();
    let wrapped = self.client.get(
      url,
      Box::new(move |result| {
        if alive.upgrade().is_none() {
          return;
        }
        delivery.complete(map_image_response(result));
      }),
    );

    Box::new(HttpClientTaskWrapper { slot, wrapped })
  }
}

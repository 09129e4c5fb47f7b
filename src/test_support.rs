//! Spies and stubs shared by unit tests across the pipeline.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use url::Url;

use crate::beer::{BeerImageDataLoader, ImageDataResult};
use crate::cache::{
  BeerImageDataCache, BeerImageDataStore, InsertionResult, RetrievalResult, SaveResult,
};
use crate::http::{HttpClient, HttpClientError, HttpResponse, HttpResult};
use crate::task::{Completion, LoaderTask};

pub fn any_url() -> Url {
  Url::parse("https://any-url.com").unwrap()
}

pub fn any_data() -> Vec<u8> {
  b"any data".to_vec()
}

pub fn any_http_error() -> HttpClientError {
  HttpClientError::Connect("offline".to_string())
}

/// Returns a completion that forwards into a channel, and the receiving end.
pub fn capture<T: Send + 'static>() -> (Completion<T>, mpsc::Receiver<T>) {
  let (tx, rx) = mpsc::channel();
  let completion: Completion<T> = Box::new(move |value| {
    let _ = tx.send(value);
  });
  (completion, rx)
}

pub fn wait<T>(rx: &mpsc::Receiver<T>) -> T {
  rx.recv_timeout(Duration::from_secs(5))
    .expect("timed out waiting for completion")
}

/// Records cancellation of the task it was handed out for.
struct SpyTask {
  url: Url,
  cancelled: Arc<Mutex<Vec<Url>>>,
}

impl LoaderTask for SpyTask {
  fn cancel(&self) {
    self.cancelled.lock().push(self.url.clone());
  }
}

struct Pending<T> {
  url: Url,
  completion: Option<Completion<T>>,
}

/// Captures requests and lets the test decide when and how each one completes.
///
/// Completing after cancellation still invokes the captured callback, which is
/// what lets tests verify that the component under test suppresses it.
pub struct CompletionSpy<T> {
  pending: Mutex<Vec<Pending<T>>>,
  cancelled: Arc<Mutex<Vec<Url>>>,
}

impl<T> Default for CompletionSpy<T> {
  fn default() -> Self {
    Self {
      pending: Mutex::new(Vec::new()),
      cancelled: Arc::new(Mutex::new(Vec::new())),
    }
  }
}

impl<T: Send + 'static> CompletionSpy<T> {
  pub fn requested_urls(&self) -> Vec<Url> {
    self.pending.lock().iter().map(|p| p.url.clone()).collect()
  }

  pub fn cancelled_urls(&self) -> Vec<Url> {
    self.cancelled.lock().clone()
  }

  pub fn complete(&self, value: T, index: usize) {
    let completion = self.pending.lock()[index].completion.take();
    if let Some(completion) = completion {
      completion(value);
    }
  }

  fn record(&self, url: &Url, completion: Completion<T>) -> Box<dyn LoaderTask> {
    self.pending.lock().push(Pending {
      url: url.clone(),
      completion: Some(completion),
    });
    Box::new(SpyTask {
      url: url.clone(),
      cancelled: self.cancelled.clone(),
    })
  }
}

pub type HttpClientSpy = CompletionSpy<HttpResult>;

impl HttpClientSpy {
  pub fn complete_with_status(&self, status: u16, data: &[u8], index: usize) {
    self.complete(Ok(HttpResponse::new(status, data)), index);
  }

  pub fn complete_with_error(&self, error: HttpClientError, index: usize) {
    self.complete(Err(error), index);
  }
}

impl HttpClient for HttpClientSpy {
  fn get(&self, url: &Url, completion: Completion<HttpResult>) -> Box<dyn LoaderTask> {
    self.record(url, completion)
  }
}

pub type ImageLoaderSpy = CompletionSpy<ImageDataResult>;

impl BeerImageDataLoader for ImageLoaderSpy {
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    self.record(url, completion)
  }
}

/// Answers every request synchronously from a closure.
pub struct HttpClientStub {
  stub: Box<dyn Fn(&Url) -> HttpResult + Send + Sync>,
  requests: AtomicUsize,
}

impl HttpClientStub {
  pub fn new(stub: impl Fn(&Url) -> HttpResult + Send + Sync + 'static) -> Self {
    Self {
      stub: Box::new(stub),
      requests: AtomicUsize::new(0),
    }
  }

  pub fn offline() -> Self {
    Self::new(|_| Err(any_http_error()))
  }

  pub fn online(data: Vec<u8>) -> Self {
    Self::new(move |_| Ok(HttpResponse::new(200, data.clone())))
  }

  pub fn request_count(&self) -> usize {
    self.requests.load(Ordering::SeqCst)
  }
}

impl HttpClient for HttpClientStub {
  fn get(&self, url: &Url, completion: Completion<HttpResult>) -> Box<dyn LoaderTask> {
    self.requests.fetch_add(1, Ordering::SeqCst);
    completion((self.stub)(url));
    Box::new(crate::task::NoopTask)
  }
}

/// Records saves and answers each one synchronously with a fixed result.
pub struct ImageCacheSpy {
  saves: Mutex<Vec<(Vec<u8>, Url)>>,
  result: SaveResult,
}

impl ImageCacheSpy {
  pub fn new(result: SaveResult) -> Self {
    Self {
      saves: Mutex::new(Vec::new()),
      result,
    }
  }

  pub fn saves(&self) -> Vec<(Vec<u8>, Url)> {
    self.saves.lock().clone()
  }
}

impl BeerImageDataCache for ImageCacheSpy {
  fn save(&self, data: Vec<u8>, url: &Url, completion: Completion<SaveResult>) {
    self.saves.lock().push((data, url.clone()));
    completion(self.result.clone());
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreMessage {
  Retrieve(Url),
  Insert(Vec<u8>, Url),
}

/// Captures store calls; the test completes them by index.
#[derive(Default)]
pub struct StoreSpy {
  messages: Mutex<Vec<StoreMessage>>,
  retrievals: Mutex<Vec<Option<Completion<RetrievalResult>>>>,
  insertions: Mutex<Vec<Option<Completion<InsertionResult>>>>,
}

impl StoreSpy {
  pub fn messages(&self) -> Vec<StoreMessage> {
    self.messages.lock().clone()
  }

  pub fn complete_retrieval(&self, result: RetrievalResult, index: usize) {
    let completion = self.retrievals.lock()[index].take();
    if let Some(completion) = completion {
      completion(result);
    }
  }

  pub fn complete_insertion(&self, result: InsertionResult, index: usize) {
    let completion = self.insertions.lock()[index].take();
    if let Some(completion) = completion {
      completion(result);
    }
  }
}

impl BeerImageDataStore for StoreSpy {
  fn retrieve(&self, url: &Url, completion: Completion<RetrievalResult>) {
    self.messages.lock().push(StoreMessage::Retrieve(url.clone()));
    self.retrievals.lock().push(Some(completion));
  }

  fn insert(&self, data: Vec<u8>, url: &Url, completion: Completion<InsertionResult>) {
    self.messages.lock().push(StoreMessage::Insert(data, url.clone()));
    self.insertions.lock().push(Some(completion));
  }
}

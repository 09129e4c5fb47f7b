//! HTTP transport used by the remote loaders.

mod client;

pub use client::ReqwestHttpClient;

use reqwest::header::HeaderMap;
use std::sync::Arc;
use url::Url;

use crate::task::{Completion, LoaderTask};

/// Raw response as seen by the loaders. Status is not interpreted here.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub headers: HeaderMap,
  pub body: Vec<u8>,
}

impl HttpResponse {
  pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self {
      status,
      headers: HeaderMap::new(),
      body: body.into(),
    }
  }

  pub fn is_ok(&self) -> bool {
    self.status == 200
  }
}

/// Transport-level failures (nothing came back that could be interpreted).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpClientError {
  #[error("Request timed out: {0}")]
  Timeout(String),
  #[error("Connection failed: {0}")]
  Connect(String),
  #[error("Request failed: {0}")]
  Request(String),
}

impl From<reqwest::Error> for HttpClientError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      Self::Timeout(e.to_string())
    } else if e.is_connect() {
      Self::Connect(e.to_string())
    } else {
      Self::Request(e.to_string())
    }
  }
}

pub type HttpResult = Result<HttpResponse, HttpClientError>;

/// Sends GET requests and reports exactly one outcome per request.
pub trait HttpClient: Send + Sync {
  /// Start a GET for `url`. Cancelling the returned task aborts the request
  /// where possible and always suppresses the completion.
  fn get(&self, url: &Url, completion: Completion<HttpResult>) -> Box<dyn LoaderTask>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
  fn get(&self, url: &Url, completion: Completion<HttpResult>) -> Box<dyn LoaderTask> {
    (**self).get(url, completion)
  }
}

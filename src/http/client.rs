use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

use super::{HttpClient, HttpResponse, HttpResult};
use crate::config::ApiConfig;
use crate::task::{Completion, CompletionSlot, LoaderTask};

/// reqwest-backed transport.
///
/// Requests run as tasks on the given tokio runtime, so `get` can be called
/// from any thread, including ones that are not part of the runtime.
#[derive(Clone)]
pub struct ReqwestHttpClient {
  client: reqwest::Client,
  runtime: Handle,
}

impl ReqwestHttpClient {
  pub fn new(config: &ApiConfig, runtime: Handle) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(config.user_agent.clone())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, runtime })
  }
}

/// Cancelling aborts the spawned request future, which drops the connection.
struct RequestTask {
  slot: Arc<CompletionSlot<HttpResult>>,
  handle: JoinHandle<()>,
}

impl LoaderTask for RequestTask {
  fn cancel(&self) {
    if self.slot.prevent_further_completions() {
      self.handle.abort();
    }
  }
}

impl HttpClient for ReqwestHttpClient {
  fn get(&self, url: &Url, completion: Completion<HttpResult>) -> Box<dyn LoaderTask> {
    let slot = Arc::new(CompletionSlot::new(completion));
    let client = self.client.clone();
    let url = url.clone();

    let delivery = slot.clone();
    let handle = self.runtime.spawn(async move {
      tracing::debug!(%url, "GET");
      let result = fetch(client, url).await;
      if let Err(e) = &result {
        tracing::debug!("Request failed: {}", e);
      }
      delivery.complete(result);
    });

    Box::new(RequestTask { slot, handle })
  }
}

async fn fetch(client: reqwest::Client, url: Url) -> HttpResult {
  let response = client.get(url).send().await?;
  let status = response.status().as_u16();
  let headers = response.headers().clone();
  let body = response.bytes().await?.to_vec();

  Ok(HttpResponse {
    status,
    headers,
    body,
  })
}

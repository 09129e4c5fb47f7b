use std::sync::Arc;
use url::Url;

use super::api_types::map_beer_list;
use super::{BeerListError, BeerListLoader, BeerListResult};
use crate::http::HttpClient;
use crate::task::Completion;

/// Fetches the beer list from the API.
///
/// Every `load` issues its own request; nothing is deduplicated or cached here.
/// Completions are dropped if the loader itself is gone by the time the
/// response arrives.
pub struct RemoteBeerListLoader<C: HttpClient> {
  url: Url,
  client: C,
  alive: Arc<()>,
}

impl<C: HttpClient> RemoteBeerListLoader<C> {
  pub fn new(url: Url, client: C) -> Self {
    Self {
      url,
      client,
      alive: Arc::new(()),
    }
  }
}

impl<C: HttpClient> BeerListLoader for RemoteBeerListLoader<C> {
  fn load(&self, completion: Completion<BeerListResult>) {
    let alive = Arc::downgrade(&self.alive);

    // List loads are not cancellable, so the transport task is not kept.
    let _task = self.client.get(
      &self.url,
      Box::new(move |result| {
        if alive.upgrade().is_none() {
          tracing::debug!("Beer list loader dropped before response arrived");
          return;
        }

        let outcome = match result {
          Ok(response) => map_beer_list(&response),
          Err(e) => {
            tracing::warn!("Beer list request failed: {}", e);
            Err(BeerListError::InvalidData)
          }
        };
        completion(outcome);
      }),
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::beer::Beer;
  use crate::test_support::{any_http_error, any_url, capture, wait, HttpClientSpy};

  fn make_sut(url: Url) -> (RemoteBeerListLoader<Arc<HttpClientSpy>>, Arc<HttpClientSpy>) {
    let client = Arc::new(HttpClientSpy::default());
    let sut = RemoteBeerListLoader::new(url, client.clone());
    (sut, client)
  }

  fn make_beer(id: i64, ibu: Option<f64>) -> Beer {
    Beer {
      id,
      name: "a name".to_string(),
      tagline: "a tagline".to_string(),
      description: "a description".to_string(),
      image_url: Url::parse("https://a-image-url.com/").unwrap(),
      abv: 4.5,
      ibu,
    }
  }

  fn make_beers_json(beers: &[Beer]) -> Vec<u8> {
    let items: Vec<serde_json::Value> = beers
      .iter()
      .map(|b| {
        serde_json::json!({
          "id": b.id,
          "name": b.name,
          "tagline": b.tagline,
          "description": b.description,
          "image_url": b.image_url.as_str(),
          "abv": b.abv,
          "ibu": b.ibu,
        })
      })
      .collect();
    serde_json::to_vec(&items).unwrap()
  }

  fn expect(
    sut: &RemoteBeerListLoader<Arc<HttpClientSpy>>,
    expected: BeerListResult,
    action: impl FnOnce(),
  ) {
    let (completion, rx) = capture();
    sut.load(completion);
    action();
    assert_eq!(wait(&rx), expected);
  }

  #[test]
  fn test_new_does_not_request_data() {
    let (_sut, client) = make_sut(any_url());

    assert!(client.requested_urls().is_empty());
  }

  #[test]
  fn test_load_requests_data_from_url() {
    let url = Url::parse("https://a-given-url.com").unwrap();
    let (sut, client) = make_sut(url.clone());

    sut.load(Box::new(|_| {}));

    assert_eq!(client.requested_urls(), vec![url]);
  }

  #[test]
  fn test_load_twice_requests_data_twice() {
    let url = Url::parse("https://a-given-url.com").unwrap();
    let (sut, client) = make_sut(url.clone());

    sut.load(Box::new(|_| {}));
    sut.load(Box::new(|_| {}));

    assert_eq!(client.requested_urls(), vec![url.clone(), url]);
  }

  #[test]
  fn test_load_delivers_invalid_data_on_client_error() {
    let (sut, client) = make_sut(any_url());

    expect(&sut, Err(BeerListError::InvalidData), || {
      client.complete_with_error(any_http_error(), 0)
    });
  }

  #[test]
  fn test_load_delivers_invalid_data_on_non_200_response() {
    let (sut, client) = make_sut(any_url());
    let data = make_beers_json(&[make_beer(1, None)]);

    for (index, status) in [199, 201, 300, 400, 500].into_iter().enumerate() {
      expect(&sut, Err(BeerListError::InvalidData), || {
        client.complete_with_status(status, &data, index)
      });
    }
  }

  #[test]
  fn test_load_delivers_invalid_data_on_200_with_invalid_json() {
    let (sut, client) = make_sut(any_url());

    expect(&sut, Err(BeerListError::InvalidData), || {
      client.complete_with_status(200, b"invalid json", 0)
    });
  }

  #[test]
  fn test_load_delivers_empty_list_on_200_with_empty_json_array() {
    let (sut, client) = make_sut(any_url());

    expect(&sut, Ok(vec![]), || client.complete_with_status(200, b"[]", 0));
  }

  #[test]
  fn test_load_delivers_beers_in_server_order() {
    let (sut, client) = make_sut(any_url());
    let beers = vec![make_beer(3, Some(41.5)), make_beer(1, None), make_beer(2, Some(0.0))];
    let data = make_beers_json(&beers);

    expect(&sut, Ok(beers), || client.complete_with_status(200, &data, 0));
  }

  #[test]
  fn test_load_does_not_deliver_after_loader_is_dropped() {
    let (sut, client) = make_sut(any_url());
    let (completion, rx) = capture::<BeerListResult>();
    sut.load(completion);

    drop(sut);
    client.complete_with_status(200, &make_beers_json(&[make_beer(1, None)]), 0);

    assert!(rx.try_recv().is_err());
  }
}

//! Serde-deserializable types matching the beer list endpoint.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;
use url::Url;

use super::types::Beer;
use super::BeerListError;
use crate::http::HttpResponse;

#[derive(Debug, Deserialize)]
pub struct ApiBeer {
  pub id: i64,
  pub name: String,
  pub tagline: String,
  pub description: String,
  pub image_url: Url,
  pub abv: f64,
  #[serde(default)]
  pub ibu: Option<f64>,
}

impl From<ApiBeer> for Beer {
  fn from(api: ApiBeer) -> Self {
    Beer {
      id: api.id,
      name: api.name,
      tagline: api.tagline,
      description: api.description,
      image_url: api.image_url,
      abv: api.abv,
      ibu: api.ibu,
    }
  }
}

/// Map a raw list response into beers, preserving server order.
pub fn map_beer_list(response: &HttpResponse) -> Result<Vec<Beer>, BeerListError> {
  if !response.is_ok() {
    return Err(BeerListError::InvalidData);
  }

  let items: Vec<ApiBeer> = serde_json::from_slice(&response.body).map_err(|e| {
    tracing::debug!("Failed to decode beer list: {}", e);
    BeerListError::InvalidData
  })?;

  Ok(items.into_iter().map(Beer::from).collect())
}

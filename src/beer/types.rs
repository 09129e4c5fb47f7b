use url::Url;

/// A beer as served by the list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Beer {
  pub id: i64,
  pub name: String,
  pub tagline: String,
  pub description: String,
  pub image_url: Url,
  pub abv: f64,
  /// Absent when the API reports `null`; not the same as zero bitterness
  pub ibu: Option<f64>,
}

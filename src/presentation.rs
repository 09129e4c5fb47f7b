//! Display formatting for beers.

use crate::beer::Beer;

/// Labels ready for rendering one beer row.
#[derive(Debug, Clone, PartialEq)]
pub struct BeerViewModel {
  pub name: String,
  pub tagline: String,
  pub abv: String,
  /// `None` when the beer has no IBU at all; zero still gets a label.
  pub ibu: Option<String>,
}

impl From<&Beer> for BeerViewModel {
  fn from(beer: &Beer) -> Self {
    Self {
      name: beer.name.clone(),
      tagline: beer.tagline.clone(),
      abv: format!("ABV: {:?}", beer.abv),
      ibu: beer.ibu.map(|ibu| format!("IBU: {:?}", ibu)),
    }
  }
}

impl BeerViewModel {
  /// Single line used by `beerlist list`.
  pub fn line(&self) -> String {
    let mut line = format!("{} ({}) {}", self.name, self.tagline, self.abv);
    if let Some(ibu) = &self.ibu {
      line.push(' ');
      line.push_str(ibu);
    }
    line
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use url::Url;

  fn make_beer(abv: f64, ibu: Option<f64>) -> Beer {
    Beer {
      id: 1,
      name: "Buzz".to_string(),
      tagline: "A Real Bitter Experience.".to_string(),
      description: "A light, crisp and bitter IPA.".to_string(),
      image_url: Url::parse("https://images.punkapi.com/v2/keg.png").unwrap(),
      abv,
      ibu,
    }
  }

  #[test]
  fn test_labels_include_abv_and_ibu() {
    let vm = BeerViewModel::from(&make_beer(4.5, Some(60.0)));

    assert_eq!(vm.name, "Buzz");
    assert_eq!(vm.abv, "ABV: 4.5");
    assert_eq!(vm.ibu.as_deref(), Some("IBU: 60.0"));
    assert_eq!(vm.line(), "Buzz (A Real Bitter Experience.) ABV: 4.5 IBU: 60.0");
  }

  #[test]
  fn test_missing_ibu_has_no_label_but_zero_does() {
    let missing = BeerViewModel::from(&make_beer(4.5, None));
    let zero = BeerViewModel::from(&make_beer(4.5, Some(0.0)));

    assert_eq!(missing.ibu, None);
    assert_eq!(missing.line(), "Buzz (A Real Bitter Experience.) ABV: 4.5");
    assert_eq!(zero.ibu.as_deref(), Some("IBU: 0.0"));
  }
}

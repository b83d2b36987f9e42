//! Model-synthesis DTOs

use serde::{Deserialize, Serialize};

/// Request to synthesize a fashion model image
///
/// Fields are optional at the wire level so that a missing value is
/// reported as a validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateModel {
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

/// Photographic style of the generated model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStyle {
    #[default]
    Studio,
    Street,
    Runway,
    Catalog,
}

impl ModelStyle {
    /// Resolves a style label; unknown or absent labels fall back to studio
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("street") => ModelStyle::Street,
            Some("runway") => ModelStyle::Runway,
            Some("catalog") => ModelStyle::Catalog,
            _ => ModelStyle::Studio,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            ModelStyle::Studio => "clean studio lighting, seamless background",
            ModelStyle::Street => "street fashion vibe, natural daylight, shallow depth of field",
            ModelStyle::Runway => "runway atmosphere, spotlight, glossy floor",
            ModelStyle::Catalog => "plain light background, even lighting, catalog look",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateModelResponse {
    pub image_url: String,
}

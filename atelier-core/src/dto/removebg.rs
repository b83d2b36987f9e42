//! Background-removal DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to strip the background from an image
///
/// `image` is either a URL or a `data:<mime>;base64,...` URI. Non-string
/// values deserialize and are then treated as a missing image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBackground {
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub background: Background,
    #[serde(default = "default_alpha_matting")]
    pub alpha_matting: bool,
    #[serde(default)]
    pub sync_mode: bool,
}

impl RemoveBackground {
    /// The image reference, if it was sent as a string
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_ref().and_then(Value::as_str)
    }
}

fn default_alpha_matting() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Transparent,
    White,
    Black,
}

/// Normalized background-removal result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveBackgroundResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let req: RemoveBackground =
            serde_json::from_str(r#"{"image":"https://cdn/a.png"}"#).unwrap();
        assert_eq!(req.output_format, OutputFormat::Png);
        assert_eq!(req.background, Background::Transparent);
        assert!(req.alpha_matting);
        assert!(!req.sync_mode);
    }

    #[test]
    fn test_non_string_image_has_no_reference() {
        let req: RemoveBackground = serde_json::from_str(r#"{"image":5}"#).unwrap();
        assert_eq!(req.image_ref(), None);

        let req: RemoveBackground = serde_json::from_str(r#"{"image":"https://cdn/a.png"}"#).unwrap();
        assert_eq!(req.image_ref(), Some("https://cdn/a.png"));
    }

    #[test]
    fn test_camel_case_fields() {
        let req: RemoveBackground = serde_json::from_str(
            r#"{"image":"x","outputFormat":"jpeg","background":"white","alphaMatting":false,"syncMode":true}"#,
        )
        .unwrap();
        assert_eq!(req.output_format, OutputFormat::Jpeg);
        assert_eq!(req.background, Background::White);
        assert!(!req.alpha_matting);
        assert!(req.sync_mode);
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let resp = RemoveBackgroundResponse {
            image_url: Some("https://x/y.png".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            serde_json::json!({ "image_url": "https://x/y.png" })
        );
    }
}

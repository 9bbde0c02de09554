use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::error::WallpaperError;

/// Resolution variants the search provider returns for one photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageVariants {
    pub medium: String,
    pub large: String,
    pub portrait: String,
    pub original: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "src")]
    pub variants: ImageVariants,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    /// Provider page for attribution.
    #[serde(default)]
    pub url: Option<String>,
}

impl ImageCandidate {
    /// URL used for both display and save: the portrait crop, else the large variant.
    pub fn display_url(&self) -> &str {
        if self.variants.portrait.is_empty() {
            &self.variants.large
        } else {
            &self.variants.portrait
        }
    }

    pub fn has_valid_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn file_stem(&self) -> String {
        format!("wallpaper-{}", self.id)
    }
}

/// A generated image kept inline as base64, exactly as the model returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub payload: String,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: payload.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn from_data_url(data_url: &str) -> Result<Self, WallpaperError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| WallpaperError::persistence("not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| WallpaperError::persistence("data URL has no payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| WallpaperError::persistence("data URL is not base64 encoded"))?;

        Ok(Self::new(mime_type, payload))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }

    pub fn decode(&self) -> Result<Vec<u8>, WallpaperError> {
        STANDARD
            .decode(self.payload.trim())
            .map_err(|e| WallpaperError::persistence(format!("invalid base64 payload: {}", e)))
    }

    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// `image/jpeg` maps to `jpg`; every other type, known or not, to `png`.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    if mime_type == "image/jpeg" {
        "jpg"
    } else {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(portrait: &str, large: &str) -> ImageCandidate {
        ImageCandidate {
            id: 42,
            width: 1080,
            height: 1920,
            variants: ImageVariants {
                medium: "m".into(),
                large: large.into(),
                portrait: portrait.into(),
                original: "o".into(),
            },
            photographer: None,
            alt: None,
            url: None,
        }
    }

    #[test]
    fn display_url_prefers_portrait() {
        assert_eq!(candidate("p", "l").display_url(), "p");
        assert_eq!(candidate("", "l").display_url(), "l");
    }

    #[test]
    fn candidate_parses_provider_json() {
        let json = r#"{
            "id": 2014422,
            "width": 3024,
            "height": 4032,
            "url": "https://www.pexels.com/photo/2014422/",
            "photographer": "Joey Farina",
            "src": {
                "original": "https://images.pexels.com/photos/2014422/a.jpeg",
                "large": "https://images.pexels.com/photos/2014422/a.jpeg?h=650",
                "medium": "https://images.pexels.com/photos/2014422/a.jpeg?h=350",
                "portrait": "https://images.pexels.com/photos/2014422/a.jpeg?fit=crop&h=1200&w=800",
                "tiny": "https://images.pexels.com/photos/2014422/a.jpeg?h=200"
            }
        }"#;
        let parsed: ImageCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, 2014422);
        assert_eq!(parsed.photographer.as_deref(), Some("Joey Farina"));
        assert!(parsed.display_url().contains("fit=crop"));
        assert_eq!(parsed.file_stem(), "wallpaper-2014422");
    }

    #[test]
    fn mime_extension_mapping() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/webp"), "png");
        assert_eq!(extension_for_mime("image/jpg"), "png");
        assert_eq!(extension_for_mime(""), "png");
    }

    #[test]
    fn data_url_payload_survives_decode_and_encode() {
        let bytes: Vec<u8> = (0..=255).collect();
        let image = GeneratedImage::from_bytes("image/png", &bytes);
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));

        let parsed = GeneratedImage::from_data_url(&url).unwrap();
        assert_eq!(parsed, image);
        let decoded = parsed.decode().unwrap();
        assert_eq!(decoded, bytes);
        assert_eq!(STANDARD.encode(&decoded), parsed.payload);
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(GeneratedImage::from_data_url("https://example.test/a.png").is_err());
        assert!(GeneratedImage::from_data_url("data:image/png;base64").is_err());
        assert!(GeneratedImage::from_data_url("data:image/png,plain").is_err());
    }

    #[test]
    fn invalid_payload_is_a_persistence_error() {
        let image = GeneratedImage::new("image/png", "***not base64***");
        assert!(matches!(image.decode(), Err(WallpaperError::Persistence(_))));
    }
}

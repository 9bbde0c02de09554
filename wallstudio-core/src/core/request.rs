use serde::Deserialize;
use serde_json::json;

use crate::core::error::WallpaperError;
use crate::core::http::{RequestContext, Transport};
use crate::core::image::{GeneratedImage, ImageCandidate};
use crate::core::storage::{GenerationSettings, SearchSettings};

pub const NO_IMAGE_GENERATED: &str = "No image was generated in the response";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<serde_json::Value>,
}

/// Parses one search entry. Entries that do not parse or have no size are dropped.
fn parse_photo(value: serde_json::Value) -> Option<ImageCandidate> {
    let id = value.get("id").cloned();
    match serde_json::from_value::<ImageCandidate>(value) {
        Ok(photo) if photo.has_valid_dimensions() => Some(photo),
        Ok(photo) => {
            log::warn!("Dropping photo {} with invalid size {}x{}", photo.id, photo.width, photo.height);
            None
        }
        Err(e) => {
            log::warn!("Dropping unreadable photo {:?}: {}", id, e);
            None
        }
    }
}

/// Runs one keyword search against the stock-photo provider.
///
/// `page` is passed through as-is; callers pick it at random from
/// [`SearchSettings::page_range`] to vary results between refreshes.
pub fn search_images(
    transport: &dyn Transport,
    settings: &SearchSettings,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<Vec<ImageCandidate>, WallpaperError> {
    let request = RequestContext::get(&settings.endpoint)
        .with_query("query", query)
        .with_query("per_page", settings.per_page)
        .with_query("page", page)
        .with_query("orientation", &settings.orientation)
        .with_query("size", &settings.size)
        .with_header("Authorization", api_key);

    log::info!("Searching wallpapers: query={:?} page={}", query, page);
    let body = transport.execute(request)?.into_success_body()?;
    let response: SearchResponse = serde_json::from_slice(&body)
        .map_err(|e| WallpaperError::Network(format!("malformed search response: {}", e)))?;

    let total = response.photos.len();
    let photos: Vec<ImageCandidate> = response.photos.into_iter().filter_map(parse_photo).collect();

    log::info!("Search returned {} photos ({} usable)", total, photos.len());
    Ok(photos)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl InlineData {
    fn into_image(self) -> Option<GeneratedImage> {
        let data = self.data.filter(|data| !data.is_empty())?;
        let mime_type = self.mime_type.unwrap_or_else(|| "image/png".to_string());
        Some(GeneratedImage::new(mime_type, data))
    }
}

/// Wraps the user's prompt in the lock-screen template sent to the model.
/// Surrounding whitespace is trimmed.
pub fn wallpaper_prompt(prompt: &str) -> String {
    format!(
        "High-quality smartphone wallpaper with aspect ratio 9:16, high resolution (1080x1920): {}. \
         Make it visually striking and suitable for a phone lock screen.",
        prompt.trim()
    )
}

fn generation_body(settings: &GenerationSettings, prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": wallpaper_prompt(prompt) }]
        }],
        "generationConfig": {
            "temperature": settings.temperature,
            "topP": settings.top_p,
            "topK": settings.top_k,
            "maxOutputTokens": settings.max_output_tokens,
            "responseModalities": ["image", "text"],
            "responseMimeType": "text/plain"
        }
    })
}

/// First inline image across all candidates and parts, in response order.
fn first_inline_image(response: GenerateContentResponse) -> Option<GeneratedImage> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data.and_then(InlineData::into_image))
}

/// Asks the generation model for one wallpaper image.
pub fn generate_image(
    transport: &dyn Transport,
    settings: &GenerationSettings,
    api_key: &str,
    prompt: &str,
) -> Result<GeneratedImage, WallpaperError> {
    let url = format!("{}/{}:generateContent", settings.endpoint, settings.model);
    let request = RequestContext::post(url)
        .with_header("x-goog-api-key", api_key)
        .with_json(&generation_body(settings, prompt));

    log::info!("Generating wallpaper with {}", settings.model);
    let body = transport.execute(request)?.into_success_body()?;
    let response: GenerateContentResponse = serde_json::from_slice(&body)
        .map_err(|e| WallpaperError::Network(format!("malformed generation response: {}", e)))?;

    let image = first_inline_image(response)
        .ok_or_else(|| WallpaperError::Generation(NO_IMAGE_GENERATED.to_string()))?;
    log::info!("Generated {} image ({} base64 chars)", image.mime_type, image.payload.len());
    Ok(image)
}

//! Special handling for the two image tools.
//!
//! Profile-image lookups feed a per-request list of URLs; image generation
//! reads from that list when the model did not pass references itself, and
//! a successful generation ends the request.

use serde::Serialize;
use serde_json::{Map, Value};

pub const PROFILE_IMAGE_TOOL: &str = "get_profile_image";
pub const IMAGE_GENERATION_TOOL: &str = "generate_image";

/// Reference images injected into a generation request.
pub const MAX_CONTEXT_IMAGES: usize = 3;

const CONTEXT_IMAGES_ARG: &str = "context_image_urls";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ProfileImage,
    ImageGeneration,
    Other,
}

impl ToolKind {
    pub fn of(name: &str) -> Self {
        match name {
            PROFILE_IMAGE_TOOL => ToolKind::ProfileImage,
            IMAGE_GENERATION_TOOL => ToolKind::ImageGeneration,
            _ => ToolKind::Other,
        }
    }
}

/// Arguments for an image-generation dispatch.
///
/// When the model supplied no non-empty `context_image_urls` list and
/// profile images were collected earlier in the request, returns a copy of
/// `arguments` carrying up to [`MAX_CONTEXT_IMAGES`] of them. The input is
/// never modified.
pub fn with_context_images(arguments: &Map<String, Value>, collected: &[String]) -> Map<String, Value> {
    let has_explicit = arguments
        .get(CONTEXT_IMAGES_ARG)
        .and_then(|v| v.as_array())
        .is_some_and(|urls| !urls.is_empty());

    let mut out = arguments.clone();
    if !has_explicit && !collected.is_empty() {
        let urls = collected
            .iter()
            .take(MAX_CONTEXT_IMAGES)
            .cloned()
            .map(Value::String)
            .collect();
        out.insert(CONTEXT_IMAGES_ARG.into(), Value::Array(urls));
    }
    out
}

/// `image_url` from a profile-image lookup result.
pub fn profile_image_url(result: &Value) -> Option<String> {
    result
        .get("image_url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Image payload returned to the client. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
    pub data_url: Option<String>,
    pub caption: Option<String>,
    pub upload_error: Option<String>,
}

impl GeneratedImage {
    /// Read the image fields from a generation result. `None` when the
    /// result is not a JSON object.
    pub fn from_result(result: &Value) -> Option<Self> {
        let obj = result.as_object()?;
        let field = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            url: field("image_url"),
            data_url: field("image_data_url"),
            caption: field("caption"),
            upload_error: field("upload_error"),
        })
    }
}

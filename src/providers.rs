//! Provider catalog and per-provider payload construction.
//!
//! Each provider behind the Kie.ai job API has its own request vocabulary.
//! [`Provider::build_input`] is the single dispatch point mapping the shared
//! [`GenerationRequest`] fields into a provider-specific `input` object, so
//! adding a provider means adding one enum variant and one match arm.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Z-Image rejects prompts longer than this; the builder truncates instead.
pub const Z_IMAGE_PROMPT_LIMIT: usize = 1000;

/// Output resolution tier requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionTier {
    OneK,
    TwoK,
    FourK,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::OneK => "1K",
            ResolutionTier::TwoK => "2K",
            ResolutionTier::FourK => "4K",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a provider produces. Drives the run's wall-clock ceiling: video
/// tasks are given twice the time of image tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// User-supplied generation parameters, immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Free-text prompt describing the desired render.
    pub prompt: String,
    /// Influence strength in [0, 1]: 0 stays close to the sketch, 1 follows
    /// the prompt. Only image-to-image providers consume it.
    pub strength: f64,
    pub resolution: ResolutionTier,
    /// Aspect ratio tag in the providers' shared vocabulary ("16:9", "4:3", ...).
    pub aspect_ratio: String,
    /// Providers selected for this run, in dispatch order.
    pub providers: Vec<Provider>,
}

/// Generation engines reachable through the Kie.ai job API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// nano-banana-pro — image-to-image.
    NanoBananaPro,
    /// flux-2/flex-image-to-image — image-to-image with resolution/strength control.
    Flux2Flex,
    /// seedream/4.5-text-to-image — text only, ignores uploaded sketches.
    Seedream45,
    /// z-image — text only, 1000-character prompt limit.
    ZImage,
}

impl Provider {
    /// Model identifier in the Kie.ai vocabulary.
    pub fn model_id(&self) -> &'static str {
        match self {
            Provider::NanoBananaPro => "nano-banana-pro",
            Provider::Flux2Flex => "flux-2/flex-image-to-image",
            Provider::Seedream45 => "seedream/4.5-text-to-image",
            Provider::ZImage => "z-image",
        }
    }

    /// Whether the provider consumes an uploaded sketch. Image providers get
    /// one job per sketch; text-only providers get a single job per run.
    pub fn takes_image_input(&self) -> bool {
        matches!(self, Provider::NanoBananaPro | Provider::Flux2Flex)
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::Image
    }

    /// Registry label: provider name, plus the 1-based sketch index for
    /// image-to-image jobs.
    pub fn label(&self, image_index: Option<usize>) -> String {
        match image_index {
            Some(i) => format!("{} #{}", self.model_id(), i + 1),
            None => self.model_id().to_string(),
        }
    }

    /// Build the provider-specific `input` object for `createTask`.
    ///
    /// `image_url` must be `Some` exactly when [`takes_image_input`] is true;
    /// text-only builders ignore it.
    ///
    /// [`takes_image_input`]: Provider::takes_image_input
    pub fn build_input(&self, req: &GenerationRequest, image_url: Option<&str>) -> Value {
        match self {
            Provider::NanoBananaPro => json!({
                "prompt": req.prompt,
                "image_input": image_url.map(|u| vec![u]).unwrap_or_default(),
                "aspect_ratio": req.aspect_ratio,
                "output_format": "png",
            }),
            Provider::Flux2Flex => {
                // Flux tops out at 2K; higher tiers are capped, not rejected.
                let resolution = match req.resolution {
                    ResolutionTier::FourK => ResolutionTier::TwoK,
                    other => other,
                };
                let aspect_ratio = if req.aspect_ratio == "auto" {
                    "1:1"
                } else {
                    &req.aspect_ratio
                };
                json!({
                    "input_urls": image_url.map(|u| vec![u]).unwrap_or_default(),
                    "prompt": req.prompt,
                    "aspect_ratio": aspect_ratio,
                    "resolution": resolution.as_str(),
                    "strength": req.strength,
                })
            }
            Provider::Seedream45 => json!({
                "prompt": req.prompt,
                "aspect_ratio": req.aspect_ratio,
                "quality": "high",
            }),
            Provider::ZImage => json!({
                "prompt": truncate_chars(&req.prompt, Z_IMAGE_PROMPT_LIMIT),
                "aspect_ratio": req.aspect_ratio,
            }),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_id())
    }
}

/// Truncate to at most `limit` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

//! Image generation handler for the MCP Image server.
//!
//! This module provides the `ImageHandler` struct and parameter types for
//! text-to-image generation using OpenAI's DALL-E 3 image API.

use crate::output;
use chrono::Utc;
use dalle_mcp_common::config::Config;
use dalle_mcp_common::error::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Path of the generation endpoint relative to the API base URL.
pub const GENERATIONS_PATH: &str = "images/generations";

/// Number of images requested per call.
pub const IMAGES_PER_REQUEST: u8 = 1;

/// Output image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
pub enum ImageSize {
    /// 1024x1024 square
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    /// 1024x1792 portrait
    #[serde(rename = "1024x1792")]
    Portrait,
    /// 1792x1024 landscape
    #[serde(rename = "1792x1024")]
    Landscape,
}

impl ImageSize {
    /// Wire value of the size.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Portrait => "1024x1792",
            ImageSize::Landscape => "1792x1024",
        }
    }
}

/// Rendering quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    #[default]
    Hd,
}

impl ImageQuality {
    /// Wire value of the quality.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

/// Rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Vivid,
    Natural,
}

impl ImageStyle {
    /// Wire value of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Vivid => "vivid",
            ImageStyle::Natural => "natural",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-to-image generation parameters.
///
/// One value per tool call; never shared between calls.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ImageGenerateParams {
    /// Text prompt describing the image to generate.
    pub prompt: String,

    /// File path for the image, or a directory to place a generated file name in.
    pub output_path: String,

    /// Image dimensions.
    #[serde(default)]
    pub size: ImageSize,

    /// Rendering quality.
    #[serde(default)]
    pub quality: ImageQuality,

    /// Rendering style.
    #[serde(default)]
    pub style: ImageStyle,
}

impl ImageGenerateParams {
    /// Validate that the required parameters are present.
    ///
    /// The prompt is checked before the output path; only the first missing
    /// parameter is reported.
    pub fn validate(&self) -> Result<(), Error> {
        if self.prompt.trim().is_empty() {
            return Err(Error::missing_parameter("prompt"));
        }

        if self.output_path.trim().is_empty() {
            return Err(Error::missing_parameter("output_path"));
        }

        Ok(())
    }
}

/// Image generation handler.
///
/// Handles image generation requests using the OpenAI image API.
pub struct ImageHandler {
    /// Application configuration.
    pub config: Config,
    /// HTTP client for API requests and image downloads.
    pub http: reqwest::Client,
}

impl ImageHandler {
    /// Create a new ImageHandler with the given configuration.
    pub fn new(config: Config) -> Self {
        debug!("Initializing ImageHandler");

        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Create a new ImageHandler with a provided HTTP client.
    pub fn with_client(config: Config, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Get the OpenAI image generation endpoint.
    pub fn get_endpoint(&self) -> String {
        self.config.endpoint(GENERATIONS_PATH)
    }

    /// Generate an image from a text prompt and save it to disk.
    ///
    /// # Arguments
    /// * `params` - Image generation parameters
    ///
    /// # Returns
    /// * `Ok(ImageGenerateResult)` - Where the image came from and where it was saved
    /// * `Err(Error)` - If validation fails, either HTTP call fails, or writing fails
    #[instrument(level = "info", name = "generate_image", skip(self, params), fields(size = %params.size, quality = %params.quality, style = %params.style))]
    pub async fn generate_image(&self, params: &ImageGenerateParams) -> Result<ImageGenerateResult, Error> {
        params.validate()?;

        let generated = self.request_generation(params).await?;
        let data = self.download_image(&generated.url).await?;

        let saved_path = output::resolve_output_path(&params.output_path, &params.prompt, Utc::now()).await;
        output::save_image(&saved_path, &data).await?;

        info!(path = %saved_path.display(), bytes = data.len(), "Saved generated image");

        Ok(ImageGenerateResult {
            url: generated.url,
            revised_prompt: generated.revised_prompt,
            saved_path,
            size_bytes: data.len(),
        })
    }

    /// Call the generation endpoint and extract the first image.
    async fn request_generation(&self, params: &ImageGenerateParams) -> Result<GeneratedImage, Error> {
        let request = GenerationRequest {
            model: &self.config.model,
            prompt: &params.prompt,
            n: IMAGES_PER_REQUEST,
            size: params.size,
            quality: params.quality,
            style: params.style,
        };

        let endpoint = self.get_endpoint();
        debug!(endpoint = %endpoint, model = %self.config.model, "Calling image generation API");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            warn!(status = %status, body = %body, "Image generation API returned an error");
            return Err(Error::generation(status, body));
        }

        let api_response: GenerationResponse = response.json().await?;

        let generated = api_response.first_image().ok_or(Error::NoImageReturned)?;
        info!(url = %generated.url, revised = generated.revised_prompt.is_some(), "Received image from API");
        Ok(generated)
    }

    /// Fetch the generated image bytes.
    async fn download_image(&self, url: &str) -> Result<Vec<u8>, Error> {
        debug!(url = %url, "Downloading generated image");

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Image download failed");
            return Err(Error::download(status));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Placeholder used when an error response body cannot be read.
pub const UNREADABLE_BODY: &str = "<unreadable body>";

/// Body text of an error response, or [`UNREADABLE_BODY`] if reading failed.
fn error_body(body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read error response body");
        UNREADABLE_BODY.to_string()
    })
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// OpenAI image generation request body.
#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u8,
    pub size: ImageSize,
    pub quality: ImageQuality,
    pub style: ImageStyle,
}

/// OpenAI image generation response body.
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Generated images, in request order
    #[serde(default)]
    pub data: Vec<GenerationData>,
}

/// One generated image in the response.
#[derive(Debug, Deserialize)]
pub struct GenerationData {
    /// Transient URL of the image
    #[serde(default)]
    pub url: Option<String>,
    /// Prompt as rewritten by the service
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

impl GenerationResponse {
    /// The first entry, if it carries a non-empty URL.
    pub fn first_image(self) -> Option<GeneratedImage> {
        let first = self.data.into_iter().next()?;
        let url = first.url.filter(|url| !url.is_empty())?;
        Some(GeneratedImage {
            url,
            revised_prompt: first.revised_prompt.filter(|p| !p.is_empty()),
        })
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Image reference extracted from a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Remote image URL
    pub url: String,
    /// Revised prompt, if the service returned one
    pub revised_prompt: Option<String>,
}

/// Result of image generation.
#[derive(Debug, Clone)]
pub struct ImageGenerateResult {
    /// Remote URL the image was downloaded from
    pub url: String,
    /// Revised prompt, if the service returned one
    pub revised_prompt: Option<String>,
    /// Final path the image was written to
    pub saved_path: PathBuf,
    /// Number of bytes written
    pub size_bytes: usize,
}

impl ImageGenerateResult {
    /// File size in kilobytes, rounded.
    pub fn file_size_kb(&self) -> u64 {
        output::size_in_kb(self.size_bytes)
    }

    /// Human-readable success report for the tool response.
    pub fn report(&self, params: &ImageGenerateParams) -> String {
        format!(
            "✅ Image generated successfully!\n\n\
             **Original Prompt:** {}\n\
             **Revised Prompt:** {}\n\
             **Image URL:** {}\n\
             **Saved to:** {}\n\
             **Size:** {}\n\
             **Quality:** {}\n\
             **Style:** {}\n\
             **File Size:** {} KB\n\n\
             The image has been saved to your specified location and is ready to use.",
            params.prompt,
            self.revised_prompt.as_deref().unwrap_or("N/A"),
            self.url,
            self.saved_path.display(),
            params.size,
            params.quality,
            params.style,
            self.file_size_kb(),
        )
    }
}

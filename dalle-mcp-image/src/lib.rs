//! DALL-E MCP Image Server Library
//!
//! This library provides image generation capabilities using the OpenAI
//! DALL-E 3 image API, exposed as a single MCP tool.

pub mod handler;
pub mod output;
pub mod server;

pub use handler::{
    GeneratedImage, ImageGenerateParams, ImageGenerateResult, ImageHandler, ImageQuality, ImageSize,
    ImageStyle,
};
pub use server::ImageServer;

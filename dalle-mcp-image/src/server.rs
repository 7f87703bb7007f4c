//! MCP Server implementation for the Image server.
//!
//! This module provides the MCP server handler that exposes the
//! `generate_image` tool. Every outcome of the tool, including failures
//! inside the generation pipeline, is reported as text content.

use crate::handler::{ImageGenerateParams, ImageHandler, ImageQuality, ImageSize, ImageStyle};
use dalle_mcp_common::config::Config;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{CallToolResult, Content, JsonObject, ServerCapabilities, ServerInfo, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{error, info};

/// Name of the image generation tool.
pub const GENERATE_IMAGE_TOOL: &str = "generate_image";

/// Parameters that must be non-empty for the tool to run.
pub const REQUIRED_PARAMS: &[&str] = &["prompt", "output_path"];

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    /// Handler for image generation operations
    handler: Arc<ImageHandler>,
}

/// Tool parameters wrapper for generate_image.
///
/// Required fields default to empty so that an absent value reaches the
/// handler's own check and is reported as a missing parameter.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ImageGenerateToolParams {
    /// Text prompt for image generation
    #[serde(default)]
    pub prompt: String,
    /// Full path where the image should be saved, or a directory to save into
    #[serde(default)]
    pub output_path: String,
    /// Image size (default: 1024x1024)
    #[serde(default)]
    pub size: Option<ImageSize>,
    /// Image quality (default: hd)
    #[serde(default)]
    pub quality: Option<ImageQuality>,
    /// Image style (default: vivid)
    #[serde(default)]
    pub style: Option<ImageStyle>,
}

impl From<ImageGenerateToolParams> for ImageGenerateParams {
    fn from(params: ImageGenerateToolParams) -> Self {
        Self {
            prompt: params.prompt,
            output_path: params.output_path,
            size: params.size.unwrap_or_default(),
            quality: params.quality.unwrap_or_default(),
            style: params.style.unwrap_or_default(),
        }
    }
}

impl ImageServer {
    /// Create a new ImageServer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self::with_handler(ImageHandler::new(config))
    }

    /// Create a new ImageServer around an existing handler.
    pub fn with_handler(handler: ImageHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Generate an image and describe the outcome as text.
    ///
    /// Never fails: pipeline errors become an `Error generating image: ...`
    /// message in a successful tool result.
    pub async fn generate_image(&self, params: ImageGenerateToolParams) -> CallToolResult {
        let gen_params: ImageGenerateParams = params.into();
        info!(prompt = %gen_params.prompt, output_path = %gen_params.output_path, "Generating image");

        let text = match self.handler.generate_image(&gen_params).await {
            Ok(result) => result.report(&gen_params),
            Err(e) => {
                error!(kind = %e.kind(), error = %e, "Error generating image");
                format!("Error generating image: {}", e)
            }
        };

        CallToolResult::success(vec![Content::text(text)])
    }

    /// Dispatch a tool call by name.
    ///
    /// Unknown tools and arguments that do not fit the schema are protocol
    /// errors; absent arguments are treated as an empty object.
    pub async fn call_tool_by_name(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match name {
            GENERATE_IMAGE_TOOL => {
                let tool_params: ImageGenerateToolParams =
                    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
                        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))?;

                Ok(self.generate_image(tool_params).await)
            }
            _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name), None)),
        }
    }

    /// Tool definitions advertised by this server.
    pub fn tools() -> Vec<Tool> {
        vec![Tool {
            name: Cow::Borrowed(GENERATE_IMAGE_TOOL),
            description: Some(Cow::Borrowed(
                "Generate an image from a text prompt using OpenAI DALL-E 3 and save it to disk. \
                 If output_path is a directory (or ends with a path separator), a file name is \
                 derived from the prompt and the current time.",
            )),
            input_schema: Arc::new(generate_image_input_schema()),
            annotations: None,
            icons: None,
            meta: None,
            output_schema: None,
            title: None,
        }]
    }
}

/// JSON schema for `generate_image`, with the required parameters marked.
fn generate_image_input_schema() -> JsonObject {
    let schema = schemars::schema_for!(ImageGenerateToolParams);
    let mut map = match serde_json::to_value(&schema).unwrap_or_default() {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    };

    map.insert(
        "required".to_string(),
        serde_json::Value::Array(
            REQUIRED_PARAMS
                .iter()
                .map(|name| serde_json::Value::String(name.to_string()))
                .collect(),
        ),
    );
    map
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server using OpenAI DALL-E 3. \
                 Use generate_image to create an image from a text prompt and save it \
                 to a file path or directory."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_ {
        async move {
            Ok(rmcp::model::ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.call_tool_by_name(params.name.as_ref(), params.arguments).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    fn test_server() -> ImageServer {
        ImageServer::new(Config::new("sk-test").with_api_base_url("http://127.0.0.1:9/v1"))
    }

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            RawContent::Text(text) => &text.text,
            other => panic!("Expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_server_info() {
        let info = test_server().get_info();
        assert!(info.instructions.unwrap().contains("generate_image"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tool_params_conversion() {
        let tool_params = ImageGenerateToolParams {
            prompt: "A cat".to_string(),
            output_path: "/tmp/cat.png".to_string(),
            size: Some(ImageSize::Landscape),
            quality: Some(ImageQuality::Standard),
            style: Some(ImageStyle::Natural),
        };

        let gen_params: ImageGenerateParams = tool_params.into();
        assert_eq!(gen_params.prompt, "A cat");
        assert_eq!(gen_params.output_path, "/tmp/cat.png");
        assert_eq!(gen_params.size, ImageSize::Landscape);
        assert_eq!(gen_params.quality, ImageQuality::Standard);
        assert_eq!(gen_params.style, ImageStyle::Natural);
    }

    #[test]
    fn test_tool_params_defaults() {
        let tool_params: ImageGenerateToolParams =
            serde_json::from_value(serde_json::json!({"prompt": "A cat", "output_path": "x.png", "size": null}))
                .unwrap();

        let gen_params: ImageGenerateParams = tool_params.into();
        assert_eq!(gen_params.size, ImageSize::Square);
        assert_eq!(gen_params.quality, ImageQuality::Hd);
        assert_eq!(gen_params.style, ImageStyle::Vivid);
    }

    #[test]
    fn test_tool_definition_schema() {
        let tools = ImageServer::tools();
        assert_eq!(tools.len(), 1);

        let tool = &tools[0];
        assert_eq!(tool.name, GENERATE_IMAGE_TOOL);
        assert!(tool.description.as_ref().is_some_and(|d| !d.is_empty()));

        let schema = serde_json::Value::Object((*tool.input_schema).clone());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!(["prompt", "output_path"]));
        for field in ["prompt", "output_path", "size", "quality", "style"] {
            assert!(schema["properties"].get(field).is_some(), "Schema missing {}", field);
        }

        let rendered = schema.to_string();
        for value in ["1024x1024", "1024x1792", "1792x1024", "standard", "hd", "vivid", "natural"] {
            assert!(rendered.contains(value), "Schema should list {}", value);
        }
    }

    #[tokio::test]
    async fn test_missing_arguments_reported_as_text() {
        let result = test_server().call_tool_by_name(GENERATE_IMAGE_TOOL, None).await.unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "Error generating image: Missing required parameter: prompt");
    }

    #[tokio::test]
    async fn test_missing_output_path_reported_as_text() {
        let args = serde_json::json!({"prompt": "A cat"});
        let result = test_server()
            .call_tool_by_name(GENERATE_IMAGE_TOOL, args.as_object().cloned())
            .await
            .unwrap();
        assert_eq!(text_of(&result), "Error generating image: Missing required parameter: output_path");
    }

    #[tokio::test]
    async fn test_invalid_enum_is_protocol_error() {
        let args = serde_json::json!({"prompt": "A cat", "output_path": "x.png", "size": "512x512"});
        let result = test_server()
            .call_tool_by_name(GENERATE_IMAGE_TOOL, args.as_object().cloned())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error() {
        let result = test_server().call_tool_by_name("image_upscale", None).await;
        let err = result.unwrap_err();
        assert!(err.message.contains("Unknown tool"));
    }
}

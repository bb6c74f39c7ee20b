use std::sync::Arc;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::canvas::RasterImage;
use crate::config::ClassifierConfig;

use super::response::parse_verdict;
use super::{ClassificationStrategy, ClassifyError, Verdict};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const PROMPT: &str = r#"You are an expert at recognizing handwritten digits. Analyze this image and identify the handwritten digit (0-9).

Please respond with ONLY a JSON object in this exact format:
{
  "digit": <number from 0-9>,
  "confidence": <decimal from 0.0 to 1.0>,
  "reasoning": "<brief explanation of why you identified this digit>"
}

Look carefully at the strokes, curves, and overall shape. Consider common ways people write each digit."#;

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn reply_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Remote strategy: sends the full captured raster as a PNG to Gemini's
/// `generateContent` endpoint and parses the JSON verdict out of the reply.
pub struct GeminiStrategy {
    client: reqwest::Client,
    config: Arc<ClassifierConfig>,
}

impl GeminiStrategy {
    pub fn new(config: Arc<ClassifierConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn request_body<'a>(&self, png_base64: String) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: PROMPT },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png",
                            data: png_base64,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

impl ClassificationStrategy for GeminiStrategy {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn classify(&self, raster: &RasterImage) -> Result<Verdict, ClassifyError> {
        let png = raster
            .encode_png()
            .map_err(|err| ClassifyError::Encode(err.to_string()))?;
        let body = self.request_body(STANDARD.encode(&png));

        log_debug!(
            "posting {}x{} raster ({} bytes png) to {}",
            raster.width(),
            raster.height(),
            png.len(),
            self.config.generate_content_url()
        );

        let response = self
            .client
            .post(self.config.generate_content_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(ERROR_BODY_LIMIT).collect();
            log_warn!("gemini returned HTTP {}: {}", status.as_u16(), detail);
            return Err(ClassifyError::RemoteService {
                status: Some(status.as_u16()),
                message: format!("gemini API error: {detail}"),
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ClassifyError::MalformedResponse(err.without_url().to_string()))?;
        let text = payload
            .reply_text()
            .ok_or_else(|| ClassifyError::MalformedResponse("no text in gemini reply".into()))?;

        parse_verdict(text)
    }
}

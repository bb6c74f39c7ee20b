use anyhow::{bail, Context, Result};
use std::{env, fmt, time::Duration};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const ENDPOINT_VAR: &str = "GEMINI_ENDPOINT";
pub const PROCESSING_DELAY_VAR: &str = "DIGIT_SKETCH_PROCESSING_DELAY_MS";

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_PROCESSING_DELAY_MS: u64 = 300;

/// Process-wide classifier settings. Loaded once in `run()` and shared
/// behind an `Arc`; nothing re-reads the environment afterwards.
#[derive(Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Artificial pause before classifying so the result doesn't flash in.
    pub processing_delay: Duration,
}

impl ClassifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            temperature: 0.1,
            max_output_tokens: 200,
            processing_delay: Duration::from_millis(DEFAULT_PROCESSING_DELAY_MS),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// mutate the real process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("{API_KEY_VAR} is not set; the remote classifier needs an API key");
        }

        let mut config = Self::new(api_key.trim());

        if let Some(model) = non_blank(lookup(MODEL_VAR)) {
            config.model = model;
        }
        if let Some(endpoint) = non_blank(lookup(ENDPOINT_VAR)) {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_blank(lookup(PROCESSING_DELAY_VAR)) {
            let millis: u64 = raw
                .parse()
                .with_context(|| format!("{PROCESSING_DELAY_VAR} must be milliseconds, got {raw:?}"))?;
            config.processing_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("processing_delay", &self.processing_delay)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

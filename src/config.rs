//! Configuration for an auto-fill session.
//!
//! Every knob lives in [`AutofillConfig`], built via its
//! [`AutofillConfigBuilder`]. Helper binaries (pdfium, tesseract) are plain
//! configuration values here; nothing in the library touches `PATH` or any
//! other process environment variable.

use crate::completion::{CompletionParams, RetryPolicy};
use crate::error::AutofillError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Chat-completions endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Model identifier used when none is configured.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Filename offered for the generated PDF.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "AI_Filled_Form.pdf";

/// Configuration for one interactive session.
///
/// # Example
/// ```rust
/// use pdf_autofill::AutofillConfig;
///
/// let config = AutofillConfig::builder()
///     .api_key("gsk_test")
///     .model("llama3-8b-8192")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct AutofillConfig {
    /// Bearer token for the completion endpoint. Only checked for presence.
    pub api_key: Option<String>,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,

    /// Sampling parameters for the fill request. Default: 0.2 / 1300 tokens.
    pub fill: CompletionParams,

    /// Sampling parameters for the Q/A request. Default: 0.0 / 400 tokens.
    pub answer: CompletionParams,

    /// Attempts per completion call, including the first. Default: 3.
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds. Default: 2000.
    pub retry_delay_ms: u64,

    /// Per-request HTTP timeout in seconds. Default: 60.
    pub request_timeout_secs: u64,

    /// tesseract executable. Default: `tesseract`, resolved through `PATH`.
    pub tesseract_path: PathBuf,

    /// tesseract language code (`-l`). Default: tesseract's own default.
    pub tesseract_lang: Option<String>,

    /// libpdfium file or the directory containing it. Default: system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Rasterisation resolution in DPI. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Cap on either rendered image dimension, in pixels. Default: 4000.
    pub max_rendered_pixels: u32,

    /// Filename offered for the generated PDF.
    pub download_filename: String,
}

impl Default for AutofillConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fill: CompletionParams::FILL,
            answer: CompletionParams::ANSWER,
            max_attempts: 3,
            retry_delay_ms: 2000,
            request_timeout_secs: 60,
            tesseract_path: PathBuf::from("tesseract"),
            tesseract_lang: None,
            pdfium_lib_path: None,
            dpi: 200,
            max_rendered_pixels: 4000,
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
        }
    }
}

impl fmt::Debug for AutofillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutofillConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("fill", &self.fill)
            .field("answer", &self.answer)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("tesseract_path", &self.tesseract_path)
            .field("tesseract_lang", &self.tesseract_lang)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("dpi", &self.dpi)
            .field("download_filename", &self.download_filename)
            .finish()
    }
}

impl AutofillConfig {
    /// Create a new builder for `AutofillConfig`.
    pub fn builder() -> AutofillConfigBuilder {
        AutofillConfigBuilder {
            config: Self::default(),
        }
    }

    /// The retry policy shared by the fill and Q/A clients.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Builder for [`AutofillConfig`].
#[derive(Debug)]
pub struct AutofillConfigBuilder {
    config: AutofillConfig,
}

impl AutofillConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Read the API key from `GROQ_API_KEY`, if set and non-empty.
    pub fn api_key_from_env(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.config.api_key = Some(key);
            }
        }
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn fill_params(mut self, params: CompletionParams) -> Self {
        self.config.fill = params;
        self
    }

    pub fn answer_params(mut self, params: CompletionParams) -> Self {
        self.config.answer = params;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn tesseract_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.tesseract_lang = Some(lang.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn download_filename(mut self, name: impl Into<String>) -> Self {
        self.config.download_filename = name.into();
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing API key is not an error here; it is reported when a
    /// completion client is constructed.
    pub fn build(self) -> Result<AutofillConfig, AutofillError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AutofillError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(AutofillError::InvalidConfig(format!(
                "endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(AutofillError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.download_filename.trim().is_empty() {
            return Err(AutofillError::InvalidConfig(
                "download filename must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

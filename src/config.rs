//! Configuration for extraction and export.
//!
//! Every knob lives in [`RevampConfig`], built through
//! [`RevampConfigBuilder`]. The session runtime clones the config into each
//! spawned task, so it is cheap to share and carries the provider as an `Arc`.

use crate::error::RevampError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Configuration shared by the extraction and export collaborators.
///
/// # Example
/// ```rust
/// use resume_revamp::RevampConfig;
///
/// let config = RevampConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4.1")
///     .export_scale(3.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.model.as_deref(), Some("gpt-4.1"));
/// ```
#[derive(Clone)]
pub struct RevampConfig {
    /// LLM model identifier. If None, the provider default (or
    /// [`DEFAULT_MODEL`] when only a provider name is set).
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.3.
    ///
    /// Extraction also rewrites the content, so a little freedom helps; much
    /// more and the model starts inventing employers.
    pub temperature: f32,

    /// Completion budget in tokens. Default: 8192.
    ///
    /// A long resume rewritten in full easily passes 4 000 output tokens; a
    /// budget that is too small cuts the JSON mid-object and the decode fails.
    pub max_tokens: usize,

    /// Replaces the built-in rewrite prompt on both the document and text paths.
    pub system_prompt: Option<String>,

    /// DPI for rasterising a PDF source before sending it to a vision model.
    /// Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Cap on either edge of a rasterised source page, in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional client-side timeout for the extraction call. Default: None.
    ///
    /// Unset means the session waits for the provider however long it takes.
    pub api_timeout_secs: Option<u64>,

    /// Raster scale for the page-image PDF export. Range: 1.0–4.0. Default: 2.0.
    ///
    /// At 1.0 one layout pixel maps to one raster pixel (96 per inch).
    pub export_scale: f32,

    /// TrueType font embedded into the page-image PDF. Default: None.
    ///
    /// Without one the export paints with the standard PDF fonts, which only
    /// cover Latin-1 plus a few typographic marks; anything else renders blank.
    pub export_font: Option<PathBuf>,
}

impl Default for RevampConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.3,
            max_tokens: 8192,
            system_prompt: None,
            dpi: 150,
            max_rendered_pixels: 2000,
            download_timeout_secs: 120,
            api_timeout_secs: None,
            export_scale: 2.0,
            export_font: None,
        }
    }
}

impl fmt::Debug for RevampConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevampConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("custom_prompt", &self.system_prompt.is_some())
            .field("dpi", &self.dpi)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("export_scale", &self.export_scale)
            .field("export_font", &self.export_font)
            .finish()
    }
}

impl RevampConfig {
    pub fn builder() -> RevampConfigBuilder {
        RevampConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RevampConfig`].
#[derive(Debug)]
pub struct RevampConfigBuilder {
    config: RevampConfig,
}

impl RevampConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
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

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    /// Not clamped here; `build()` rejects values outside 1.0–4.0.
    pub fn export_scale(mut self, scale: f32) -> Self {
        self.config.export_scale = scale;
        self
    }

    pub fn export_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.export_font = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RevampConfig, RevampError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(RevampError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if !(1.0..=4.0).contains(&c.export_scale) {
            return Err(RevampError::InvalidConfig(format!(
                "Export scale must be 1.0–4.0, got {}",
                c.export_scale
            )));
        }
        if c.max_tokens == 0 {
            return Err(RevampError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(RevampError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

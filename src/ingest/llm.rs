//! LLM-backed extraction: one chat call per ingestion.
//!
//! Prompt text lives in [`crate::prompts`]; this module only decides which
//! prompt and which attachments go into the request, sends it, and hands the
//! reply to [`super::decode`].
//!
//! ## Request layout
//!
//! | Source | System message | User message |
//! |--------|----------------|--------------|
//! | PDF    | document prompt | instruction + one PNG per page |
//! | image  | document prompt | instruction + the image as uploaded |
//! | text/* or pasted text | text prompt | `Resume Text:` + the text |
//!
//! There is no retry loop. The session surfaces a failure and the user
//! decides whether to try again.

use super::{decode, encode, render, ExtractionInput, ResumeExtractor, SourceDocument};
use crate::config::{RevampConfig, DEFAULT_MODEL};
use crate::error::ExtractionError;
use crate::prompts::{self, PromptKind};
use crate::record::ResumeRecord;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// [`ResumeExtractor`] backed by an `edgequake-llm` provider.
///
/// The provider is resolved on every call, so a missing API key surfaces as
/// an extraction failure in the session rather than at construction.
#[derive(Debug, Clone)]
pub struct LlmExtractor {
    config: RevampConfig,
}

impl LlmExtractor {
    pub fn new(config: RevampConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RevampConfig {
        &self.config
    }

    /// Build the chat messages for one extraction.
    async fn build_messages(
        &self,
        input: ExtractionInput,
        job_description: Option<&str>,
    ) -> Result<Vec<ChatMessage>, ExtractionError> {
        let custom = self.config.system_prompt.as_deref();
        match input {
            ExtractionInput::Text(text) => Ok(text_messages(&text, custom, job_description)),
            ExtractionInput::Document(doc) if doc.is_text() => {
                let text = String::from_utf8_lossy(&doc.bytes);
                Ok(text_messages(&text, custom, job_description))
            }
            ExtractionInput::Document(doc) => {
                let images = self.document_images(doc).await?;
                Ok(vec![
                    ChatMessage::system(prompts::system_prompt(
                        PromptKind::Document,
                        custom,
                        job_description,
                    )),
                    ChatMessage::user_with_images(prompts::DOCUMENT_USER_PROMPT, images),
                ])
            }
        }
    }

    async fn document_images(&self, doc: SourceDocument) -> Result<Vec<ImageData>, ExtractionError> {
        if doc.is_image() {
            return Ok(vec![encode::encode_bytes(&doc.bytes, &doc.mime_type)]);
        }
        if !doc.is_pdf() {
            return Err(ExtractionError::UnsupportedInput {
                name: doc.name,
                mime_type: doc.mime_type,
            });
        }
        let pages =
            render::rasterise_pdf(doc.bytes, self.config.dpi, self.config.max_rendered_pixels)
                .await?;
        pages
            .iter()
            .enumerate()
            .map(|(idx, page)| {
                encode::encode_page(page).map_err(|e| ExtractionError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("PNG encoding failed: {e}"),
                })
            })
            .collect()
    }
}

fn text_messages(text: &str, custom: Option<&str>, job_description: Option<&str>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(prompts::system_prompt(PromptKind::Text, custom, job_description)),
        ChatMessage::user(prompts::text_user_prompt(text)),
    ]
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &RevampConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[async_trait]
impl ResumeExtractor for LlmExtractor {
    async fn extract(
        &self,
        input: ExtractionInput,
        job_description: Option<&str>,
    ) -> Result<ResumeRecord, ExtractionError> {
        let provider = resolve_provider(&self.config)?;
        let messages = self.build_messages(input, job_description).await?;
        let options = build_options(&self.config);

        let start = Instant::now();
        let call = provider.chat(&messages, Some(&options));
        let result = match self.config.api_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
                .await
                .map_err(|_| ExtractionError::Timeout { secs })?,
            None => call.await,
        };
        let response = result.map_err(|e| {
            warn!("Extraction call failed: {}", e);
            ExtractionError::LlmApiError {
                message: e.to_string(),
            }
        })?;

        debug!(
            "Extraction: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        let record = decode::decode_record(&response.content)?;
        info!(
            "Extracted resume for '{}' ({} positions, {} skills)",
            record.full_name,
            record.experience.len(),
            record.skills.len()
        );
        Ok(record)
    }
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ExtractionError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExtractionError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_MODEL`].
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when
///    both are set.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, so a machine with several keys
///    does not pick a provider at random.
/// 5. **Auto-detection** via `ProviderFactory::from_env`.
pub fn resolve_provider(config: &RevampConfig) -> Result<Arc<dyn LLMProvider>, ExtractionError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|key| !key.is_empty()) {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExtractionError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

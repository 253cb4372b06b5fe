use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

pub mod prompts;

/// Default chat-completion model on the inference router.
pub const HF_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";

const HF_ROUTER_URL: &str = "https://router.huggingface.co/v1/chat/completions";

const DEFAULT_TEMPLATE: &str = r#"# Meeting Minutes
## Agenda
## Key Decisions
## Action Items
## Next Steps"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLength {
    #[default]
    Normal,
    Longer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinutesTemplate {
    pub structure: Option<String>,
    pub content: String,
}

impl Default for MinutesTemplate {
    fn default() -> Self {
        Self {
            structure: None,
            content: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinutesOptions {
    pub meeting_title: Option<String>,
    pub length: OutputLength,
    /// Previously generated minutes to expand instead of starting over.
    pub current_content: Option<String>,
    pub template: MinutesTemplate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionOptions {
    pub platform: String,
    pub tone: String,
    pub content: String,
    #[serde(default)]
    pub length: OutputLength,
    #[serde(default)]
    pub current_content: Option<String>,
}

/// Text synthesis over a finished transcript. The implementation is an
/// opaque remote call; callers only see text or an error.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn generate_minutes(&self, transcript: &str, options: &MinutesOptions) -> Result<String>;
    async fn generate_caption(&self, options: &CaptionOptions) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Hugging Face Inference Router client speaking the OpenAI-style
/// chat-completion shape.
pub struct HfSynthesizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl HfSynthesizer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: HF_MODEL.to_string(),
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("HF_API_KEY is not configured");
        }

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(HF_ROUTER_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("chat completion request failed with status {}", response.status());
        }

        let body: ChatResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("chat completion returned no choices"))?;

        Ok(choice.message.content.trim().to_string())
    }
}

#[async_trait]
impl Synthesizer for HfSynthesizer {
    /// Two-stage generation: extract the meeting intelligence first,
    /// then synthesize it into the requested template. When the caller
    /// supplies existing minutes and asks for a longer version, a single
    /// expansion pass is used instead.
    async fn generate_minutes(&self, transcript: &str, options: &MinutesOptions) -> Result<String> {
        let title = options.meeting_title.as_deref().unwrap_or("Untitled Meeting");
        let longer = options.length == OutputLength::Longer;
        info!(
            "Starting minutes generation for: {} (length: {:?}, expand: {})",
            title,
            options.length,
            options.current_content.is_some()
        );

        if longer {
            if let Some(current) = &options.current_content {
                let user =
                    prompts::expansion_prompt(current, prompts::truncate_chars(transcript, 10_000));
                return self.chat(prompts::EXPANSION_SYSTEM, &user, 4000, 0.5).await;
            }
        }

        let extraction =
            prompts::extraction_prompt(prompts::truncate_chars(transcript, 15_000), longer);
        let intelligence = self
            .chat(
                prompts::EXTRACTION_SYSTEM,
                &extraction,
                if longer { 2000 } else { 1200 },
                0.3,
            )
            .await?;

        let synthesis = prompts::synthesis_prompt(options, &intelligence);
        let minutes = self
            .chat(
                prompts::SYNTHESIS_SYSTEM,
                &synthesis,
                if longer { 3500 } else { 2000 },
                0.6,
            )
            .await?;

        info!("Minutes generation complete ({} chars)", minutes.len());
        Ok(minutes)
    }

    async fn generate_caption(&self, options: &CaptionOptions) -> Result<String> {
        let longer = options.length == OutputLength::Longer;
        let expanding = longer && options.current_content.is_some();
        let system = prompts::caption_system(options.length, expanding);

        let user = match &options.current_content {
            Some(current) if longer => {
                prompts::caption_expansion_prompt(current, &prompts::caption_prompt(options))
            }
            _ => prompts::caption_prompt(options),
        };

        self.chat(&system, &user, if longer { 2000 } else { 500 }, 0.7)
            .await
    }
}

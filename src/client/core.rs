// File: src/client/core.rs
use crate::client::protocol::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::Config;
use crate::model::{Contact, GiftIdea};
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that suggests thoughtful gift ideas. \
Provide 3 diverse gift ideas based on the user's input. For each idea, provide a short name \
(max 5 words) and a brief, compelling description (1-2 sentences). Format each idea as: \
'Name: [Gift Name]\nDescription: [Gift Description]'. Separate each gift idea with '---'. \
Do not include any other text or pleasantries.";

#[derive(Debug, Error)]
pub enum GiftError {
    /// Rejected locally, before any network call is attempted.
    #[error("Invalid or missing API key. Please set one in Settings.")]
    InvalidApiKey,

    #[error("Gift request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed with code {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The service answered 200 but put an error object in the body.
    #[error("API Error: {0}")]
    Service(String),

    #[error("No gift ideas found or empty response from API.")]
    EmptyResponse,
}

/// Client for the gift-suggestion chat-completion endpoint.
///
/// One POST per request, bearer-authenticated, never retried; every failure
/// mode maps to a distinct `GiftError` so callers can show a meaningful
/// message.
pub struct GiftClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl GiftClient {
    /// Fails with `InvalidApiKey` when the configured key is blank or not
    /// shaped like a service key, so misconfiguration surfaces here and not
    /// as a confusing HTTP 401 later.
    pub fn new(config: &Config) -> Result<Self, GiftError> {
        let key = config.api_key.trim();
        if key.is_empty() || !key.starts_with("sk-") {
            return Err(GiftError::InvalidApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub async fn suggest_gifts(
        &self,
        contact: &Contact,
        occasion: &str,
    ) -> Result<Vec<GiftIdea>, GiftError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", build_prompt(contact, occasion)),
            ],
        };

        log::debug!("Requesting gift ideas for contact {}", contact.id);
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GiftError::Api { status, body });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        if let Some(err) = parsed.error {
            return Err(GiftError::Service(err.message));
        }

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.clone())
            .ok_or(GiftError::EmptyResponse)?;

        Ok(parse_gift_ideas(&content))
    }
}

fn build_prompt(contact: &Contact, occasion: &str) -> String {
    let interests = match &contact.notes {
        Some(notes) => format!("Their notes mention: {}.", notes),
        None => "No specific notes available.".to_string(),
    };
    let occasion_info = if occasion.eq_ignore_ascii_case("birthday")
        && let Some(birthday) = &contact.birthday
    {
        format!("It's for their birthday on {} (format may vary).", birthday)
    } else {
        format!("It's for the occasion: {}.", occasion)
    };

    format!(
        "Suggest gift ideas for {}. {} {} Consider their potential preferences and suggest unique and thoughtful gifts.",
        contact.name, occasion_info, interests
    )
}

/// Splits the model's reply on the literal `---` delimiter and keeps every
/// section that carries both a `Name:` and a `Description:` line. Sections
/// missing either label are dropped silently.
pub fn parse_gift_ideas(response_text: &str) -> Vec<GiftIdea> {
    let mut ideas = Vec::new();

    for section in response_text.split("---") {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }

        let name = section
            .lines()
            .find_map(|line| line.trim().strip_prefix("Name:"))
            .map(str::trim);
        let description = section
            .lines()
            .find_map(|line| line.trim().strip_prefix("Description:"))
            .map(str::trim);

        if let (Some(name), Some(description)) = (name, description) {
            ideas.push(GiftIdea {
                name: name.to_string(),
                description: description.to_string(),
                shopping_link: Some(shopping_link(name)),
            });
        }
    }
    ideas
}

fn shopping_link(gift_name: &str) -> String {
    reqwest::Url::parse_with_params("https://www.amazon.com/s", [("k", gift_name)])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| "https://www.amazon.com".to_string())
}

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

use crate::scoring::{EntitySentiment, SentimentLabel};
use crate::settings::Settings;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").unwrap());

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("{0} is not set")]
    MissingCredential(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("no content in classifier response")]
    EmptyResponse,

    #[error("invalid response format: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        known_factors: &[String],
    ) -> Result<Vec<EntitySentiment>, ClassifierError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    entity: String,
    sentiment: String,
}

pub struct OpenAiClassifier {
    client: Client,
    api_base: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl OpenAiClassifier {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClassifierError> {
        let c = &settings.classifier;
        let api_key = std::env::var(&c.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!("{} is not set; analysis requests will fail", c.api_key_env);
        }
        Self::new(
            c.api_base.clone(),
            c.model.clone(),
            c.api_key_env.clone(),
            api_key,
            Duration::from_secs(c.timeout_secs),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: &str) -> Result<String, ClassifierError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ClassifierError::MissingCredential(self.api_key_env.clone()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ClassifierError::EmptyResponse)
    }

    pub async fn classify_sentence(&self, sentence: &str) -> Result<SentimentLabel, ClassifierError> {
        let content = self.complete(&build_sentence_prompt(sentence)).await?;
        parse_sentence_label(&content)
    }
}

#[async_trait]
impl SentimentClassifier for OpenAiClassifier {
    async fn classify(
        &self,
        text: &str,
        known_factors: &[String],
    ) -> Result<Vec<EntitySentiment>, ClassifierError> {
        let content = self.complete(&build_prompt(text, known_factors)).await?;
        parse_entities(&content, known_factors)
    }
}

pub fn build_prompt(text: &str, known_factors: &[String]) -> String {
    let factor_list = known_factors.join(", ");
    let labels = SentimentLabel::mentioned_labels()
        .iter()
        .map(|l| format!("\"{l}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let first = known_factors.first().map(String::as_str).unwrap_or("Factor");
    let second = known_factors.get(2).map(String::as_str).unwrap_or(first);

    format!(
        "Analyze the following text for mentions of these success factors: {factor_list} \
         and their associated sentiments. Respond in JSON format with an array of objects, \
         each containing \"entity\" and \"sentiment\" keys. Possible sentiment values are \
         {labels}. Leave a factor out entirely if the text does not mention it.\n\n\
         Text: \"{text}\"\n\n\
         Example response:\n\
         [\n  {{\"entity\": \"{first}\", \"sentiment\": \"positive\"}},\n  \
         {{\"entity\": \"{second}\", \"sentiment\": \"strong positive\"}}\n]"
    )
}

pub fn build_sentence_prompt(sentence: &str) -> String {
    format!(
        "Analyze the sentiment of the following sentence. \
         Respond with only 'positive' or 'negative': {sentence}"
    )
}

pub fn parse_sentence_label(content: &str) -> Result<SentimentLabel, ClassifierError> {
    let answer = content
        .trim()
        .trim_matches(|c: char| c == '.' || c == '"' || c == '\'')
        .trim();
    match SentimentLabel::from_str(answer) {
        Ok(label @ (SentimentLabel::Positive | SentimentLabel::Negative)) => Ok(label),
        _ => Err(ClassifierError::MalformedResponse(format!(
            "expected positive or negative, got {answer:?}"
        ))),
    }
}

pub fn parse_entities(
    content: &str,
    known_factors: &[String],
) -> Result<Vec<EntitySentiment>, ClassifierError> {
    let body = CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content);

    let raw: Vec<RawEntity> = serde_json::from_str(body.trim())
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

    let mut entities = Vec::with_capacity(raw.len());
    for item in raw {
        let sentiment = SentimentLabel::from_str(&item.sentiment).map_err(|_| {
            ClassifierError::MalformedResponse(format!("unknown sentiment {:?}", item.sentiment))
        })?;
        if !sentiment.is_mentioned() {
            continue;
        }

        let Some(factor) = known_factors
            .iter()
            .find(|f| f.eq_ignore_ascii_case(item.entity.trim()))
        else {
            tracing::debug!("dropping unknown factor {:?}", item.entity);
            continue;
        };

        entities.push(EntitySentiment::new(factor.clone(), sentiment));
    }

    Ok(entities)
}

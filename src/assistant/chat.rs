//! Question answering over a sample of the time log.
//!
//! The first rows of the log are rendered as CSV and sent with the
//! question to an OpenAI-compatible chat-completions endpoint.

use crate::config::{AssistantConfig, ColumnNames};
use crate::error::AssistantError;
use crate::models::TimeEntry;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Chat message sent to the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat-completions response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Answers questions about a time log with a hosted language model.
pub struct DataAssistant {
    config: AssistantConfig,
    http_client: reqwest::Client,
    context_csv: String,
    show_progress: bool,
}

impl DataAssistant {
    /// Create an assistant whose context is the first `sample_rows` entries.
    pub fn new(
        config: AssistantConfig,
        columns: &ColumnNames,
        entries: &[TimeEntry],
        show_progress: bool,
    ) -> Result<Self, AssistantError> {
        info!(
            "Initializing assistant with model {} at {}",
            config.model, config.api_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let context_csv = sample_csv(entries, columns, config.sample_rows);
        debug!(
            "Context sample: {} rows, {} bytes",
            entries.len().min(config.sample_rows),
            context_csv.len()
        );

        Ok(Self {
            config,
            http_client,
            context_csv,
            show_progress,
        })
    }

    /// Ask one question and return the model's answer.
    pub async fn ask(&self, question: &str) -> Result<String, AssistantError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AssistantError::MissingApiKey)?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(&self.context_csv, question),
            temperature: self.config.temperature,
        };

        let spinner = self.spinner();
        let result = self.send(api_key, &request).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        result
    }

    async fn send(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.config.api_url);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    AssistantError::Connect(self.config.api_url.clone())
                } else {
                    AssistantError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status,
                body: api_error_message(&body),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        extract_answer(completion)
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Asking {}...", self.config.model));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// System and user messages for a question.
pub fn build_messages(context_csv: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new("system", SYSTEM_PROMPT),
        ChatMessage::new("user", build_prompt(context_csv, question)),
    ]
}

/// User prompt embedding the CSV sample.
pub fn build_prompt(context_csv: &str, question: &str) -> String {
    format!(
        "You are a data expert. Here's a dataset:\n{}\n\nQuestion: {}\nAnswer:",
        context_csv, question
    )
}

fn extract_answer(completion: ChatCompletionResponse) -> Result<String, AssistantError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(AssistantError::EmptyAnswer)
}

/// Pull `error.message` out of an API error body, or return the body as-is.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Render the first `rows` entries as CSV, header included.
pub fn sample_csv(entries: &[TimeEntry], columns: &ColumnNames, rows: usize) -> String {
    let header = [
        columns.member.as_str(),
        columns.client.as_str(),
        columns.week.as_str(),
        columns.activity.as_str(),
        columns.comments.as_str(),
        columns.time.as_str(),
        "Hours",
    ];

    let mut csv = header
        .iter()
        .map(|h| csv_field(h))
        .collect::<Vec<_>>()
        .join(",");
    csv.push('\n');

    for entry in entries.iter().take(rows) {
        let fields = [
            label_text(&entry.member),
            label_text(&entry.client),
            label_text(&entry.week),
            label_text(&entry.activity),
            entry.comments.clone().unwrap_or_default(),
            entry.minutes.map(|m| m.to_string()).unwrap_or_default(),
            entry.hours().map(|h| h.to_string()).unwrap_or_default(),
        ];
        csv.push_str(
            &fields
                .iter()
                .map(|f| csv_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
        csv.push('\n');
    }

    csv
}

fn label_text(label: &Option<crate::models::Label>) -> String {
    label.as_ref().map(|l| l.to_string()).unwrap_or_default()
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// System prompt for question answering.
const SYSTEM_PROMPT: &str = "You are a helpful data expert.";

//! Content generation through a chat-completion endpoint, and the
//! background job that turns a prompt into a saved document.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::assembler::{DocumentRequest, create_document};
use crate::config::{ApiConfig, StyleConfig};
use crate::error::{Error, Result};
use crate::filter::filter_ai_symbols;

const TEMPERATURE: f32 = 0.7;

/// Anything that turns a prompt into text.
pub trait ContentSource: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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

#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ApiConfig,
    client: reqwest::blocking::Client,
    filter_symbols: bool,
}

impl ChatClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::blocking::Client::new(),
            filter_symbols: true,
        }
    }

    /// Whether generated text goes through [`filter_ai_symbols`].
    pub fn with_symbol_filter(mut self, enabled: bool) -> Self {
        self.filter_symbols = enabled;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Network(format!("API error {status}: {body}")));
        }

        let body: ChatResponse = response.json()?;
        extract_content(body)
    }
}

fn extract_content(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(Error::GenerationEmpty)
}

impl ContentSource for ChatClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let text = self.complete(prompt).inspect_err(|e| {
            log::warn!("API request failed: {e}");
        })?;
        if !self.filter_symbols {
            return Ok(text);
        }
        let filtered = filter_ai_symbols(&text);
        if filtered.trim().is_empty() {
            return Err(Error::GenerationEmpty);
        }
        Ok(filtered)
    }
}

/// What a background job should produce.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub prompt: String,
    pub output: PathBuf,
    pub request: DocumentRequest,
}

/// Runs at most one generate-and-assemble job at a time on a background
/// thread. The job cannot be cancelled once dispatched.
pub struct Dispatcher<S> {
    source: Arc<S>,
    defaults: StyleConfig,
    busy: Arc<AtomicBool>,
}

impl<S: ContentSource + 'static> Dispatcher<S> {
    pub fn new(source: S, defaults: StyleConfig) -> Self {
        Self {
            source: Arc::new(source),
            defaults,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Starts `job`, or returns `None` while another job is in flight.
    ///
    /// `on_complete` receives the saved path or the error; the dispatcher
    /// accepts new work only after it returns.
    pub fn dispatch<F>(&self, job: GenerationJob, on_complete: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Result<PathBuf>) + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("generation already in flight");
            return None;
        }

        let source = Arc::clone(&self.source);
        let defaults = self.defaults.clone();
        let busy = Arc::clone(&self.busy);
        Some(std::thread::spawn(move || {
            let _release = BusyGuard(busy);
            let outcome = run_job(source.as_ref(), &job, &defaults);
            on_complete(outcome);
        }))
    }
}

/// Clears the busy flag when the job thread finishes, panics included.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Generates content for `job` and writes it into a document.
pub fn run_job<S: ContentSource + ?Sized>(
    source: &S,
    job: &GenerationJob,
    defaults: &StyleConfig,
) -> Result<PathBuf> {
    let content = source.generate(&job.prompt)?;
    create_document(&content, &job.output, &job.request, defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_content_is_used() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "hello");
    }

    #[test]
    fn missing_or_blank_content_is_empty_generation() {
        for raw in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"  \n"}}]}"#,
        ] {
            let body: ChatResponse = serde_json::from_str(raw).unwrap();
            assert!(matches!(extract_content(body), Err(Error::GenerationEmpty)));
        }
    }

    #[test]
    fn request_body_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "p",
            }],
            temperature: TEMPERATURE,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "p");
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }
}

pub mod conversation;


use std::io::Write;
use std::time::Duration;

use futures::Stream;
use futures::StreamExt;
use futures::TryStreamExt;
use reqwest::{self, IntoUrl, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gpt-oss:20b";

/// Ceiling for a full streamed generation.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(600);
/// Shorter ceiling for quiet (non-echoing) generations.
const QUIET_TIMEOUT: Duration = Duration::from_secs(120);
/// The tags listing is informational, keep it snappy.
const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

const ELLIPSIS: char = '\u{2026}';

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_util::codec::LinesCodecError> for OllamaError {
    fn from(err: tokio_util::codec::LinesCodecError) -> Self {
        Self::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

/// Client for a locally reachable Ollama-compatible server.
///
/// Holds the model identifier and the resolved endpoint URLs; cheap to clone.
/// Construct one explicitly and hand it to whoever needs it, there is no
/// global instance.
#[derive(Debug, Clone)]
pub struct Ollama {
    pub model: String,
    generate_url: Url,
    tags_url: Url,
    client: reqwest::Client,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct OllamaRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

impl OllamaRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
        }
    }
}

/// One record of the newline-delimited generation stream.
///
/// Both fields are optional on the wire: intermediate records carry a text
/// fragment, the terminal record carries `done: true`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct OllamaStreamChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Deserialize, Debug)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize, Debug)]
struct ModelTag {
    name: String,
}

impl Ollama {
    pub fn new(base_url: impl IntoUrl, model: impl Into<String>) -> Result<Ollama, OllamaError> {
        let base = base_url.into_url()?;
        let base = base.as_str().trim_end_matches('/').to_string();
        let generate_url = into_url(format!("{base}/api/generate"))?;
        let tags_url = into_url(format!("{base}/api/tags"))?;
        Ok(Ollama {
            model: model.into(),
            generate_url,
            tags_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn create_default() -> Result<Ollama, OllamaError> {
        Ollama::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    /// Lists the model names the server advertises on `/api/tags`, in order.
    ///
    /// Network failures, non-2xx statuses and malformed bodies all surface as
    /// `Err`, so an empty `Ok` really means the server has no models.
    pub async fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let res = self
            .client
            .get(self.tags_url.clone())
            .timeout(TAGS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let tags: TagsResponse = res.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Opens a streamed generation request and decodes it into chunks.
    ///
    /// Connection failures and non-2xx statuses fail the call; malformed JSON
    /// lines inside an otherwise healthy stream are skipped, a single corrupt
    /// record should not abort the whole response. The timeout bounds the
    /// entire body read.
    pub async fn stream_generate(
        &self,
        prompt: impl Into<String>,
        timeout: Duration,
    ) -> Result<impl Stream<Item = Result<OllamaStreamChunk, OllamaError>>, OllamaError> {
        let request = OllamaRequest::new(self.model.as_str(), prompt);

        let res = self
            .client
            .post(self.generate_url.clone())
            .timeout(timeout)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let byte_stream = res
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let stream_reader = StreamReader::new(byte_stream);

        let lines = FramedRead::new(stream_reader, LinesCodec::new());

        let parsed = lines.filter_map(|line_result| async move {
            match line_result {
                Ok(line) if !line.trim().is_empty() => {
                    match serde_json::from_str::<OllamaStreamChunk>(line.trim()) {
                        Ok(chunk) => Some(Ok(chunk)),
                        Err(err) => {
                            log::debug!("skipping malformed stream line: {err}");
                            None
                        }
                    }
                }
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            }
        });

        Ok(parsed)
    }

    /// Generates text for `prompt`, optionally echoing fragments to stdout as
    /// they arrive. Returns the full concatenated text, trimmed.
    ///
    /// Stops consuming the stream at the first `done: true` record. When
    /// echoing, each fragment is flushed immediately and a trailing newline is
    /// written once the stream ends.
    pub async fn generate(
        &self,
        prompt: impl Into<String>,
        echo: bool,
    ) -> Result<String, OllamaError> {
        let stream = self.stream_generate(prompt, GENERATE_TIMEOUT).await?;
        futures::pin_mut!(stream);

        let mut text = String::new();
        let mut out = std::io::stdout();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.response.is_empty() {
                if echo {
                    write!(out, "{}", chunk.response)?;
                    out.flush()?;
                }
                text.push_str(&chunk.response);
            }
            if chunk.done {
                break;
            }
        }
        if echo {
            writeln!(out)?;
        }

        Ok(text.trim().to_string())
    }

    /// Generates text without touching stdout, collapsed to a single line and
    /// clipped to at most `max_length` characters.
    pub async fn generate_quiet(
        &self,
        prompt: impl Into<String>,
        max_length: usize,
    ) -> Result<String, OllamaError> {
        let stream = self.stream_generate(prompt, QUIET_TIMEOUT).await?;
        futures::pin_mut!(stream);

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            text.push_str(&chunk.response);
            if chunk.done {
                break;
            }
        }

        Ok(clip(&collapse_whitespace(&text), max_length))
    }
}

/// Adapter so `into_url` is callable on concrete strings; the method lives on
/// reqwest's sealed supertrait and is only reachable through an `IntoUrl`
/// bound.
fn into_url(url: impl IntoUrl) -> Result<Url, reqwest::Error> {
    url.into_url()
}

/// Collapses every run of whitespace (newlines and tabs included) into a
/// single space and trims the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clips `text` to at most `max_length` characters, cutting at the last space
/// within the limit and appending an ellipsis. Text within the limit passes
/// through unchanged.
fn clip(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(max_length).collect();
    match cut.rfind(' ') {
        Some(idx) => cut.truncate(idx),
        // One unbroken word, drop a char to make room for the marker.
        None => {
            cut.pop();
        }
    }
    cut.push(ELLIPSIS);
    cut
}

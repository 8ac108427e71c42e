//! Gateway to the local Ollama backend.
//!
//! Transport and backend failures never propagate as errors from here: a
//! completion collapses to [`CompletionOutcome::Failed`] and a stream ends
//! with [`StreamEvent::Failed`], both after logging. Callers decide what the
//! user sees.

pub mod types;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use bytes::BytesMut;
use futures::StreamExt;
use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::config::AssistantConfig;
use types::{ChatMessage, ChatRequest, ChatResponse, ChatStreamLine};

/// Result of a single non-streaming chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The backend answered with non-empty content.
    Reply(String),
    /// The backend answered, but with no content.
    Empty,
    /// Transport, HTTP, or decode failure. Already logged.
    Failed,
}

/// One event of a streaming chat call. The sequence is finite, ordered, and
/// not restartable; the final event is always `Done` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(String),
    Done,
    Failed,
}

#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    chat_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client for the model backend")?;

        Ok(Self {
            http,
            chat_url: format!("{}/api/chat", config.ollama_url.trim_end_matches('/')),
            model: config.model_name.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the prompt as one blocking chat call and extracts the reply.
    pub async fn complete(&self, prompt: &str) -> CompletionOutcome {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
        };

        let response = match self
            .http
            .post(&self.chat_url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Model backend unreachable at {}: {err}", self.chat_url);
                return CompletionOutcome::Failed;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Model backend returned {status}: {body}");
            return CompletionOutcome::Failed;
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("Model backend returned an unreadable response: {err}");
                return CompletionOutcome::Failed;
            }
        };

        let content = parsed.message.map(|m| m.content).unwrap_or_default();
        if content.is_empty() {
            warn!("Model backend returned an empty reply");
            CompletionOutcome::Empty
        } else {
            info!("Received reply from model backend");
            CompletionOutcome::Reply(content)
        }
    }

    /// Starts a streaming chat call. Chunks arrive on the returned channel in
    /// emission order. No overall timeout applies; a hung backend parks the
    /// worker driving this stream, nothing else.
    pub fn stream(&self, prompt: &str) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let http = self.http.clone();
        let chat_url = self.chat_url.clone();
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            stream: true,
        };

        tokio::spawn(async move {
            info!("Starting streaming chat with model backend");

            let response = match http.post(&chat_url).json(&request).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    error!(
                        "Model backend returned {} for streaming chat",
                        response.status()
                    );
                    let _ = tx.send(StreamEvent::Failed).await;
                    return;
                }
                Err(err) => {
                    error!("Model backend unreachable at {chat_url}: {err}");
                    let _ = tx.send(StreamEvent::Failed).await;
                    return;
                }
            };

            let mut body = response.bytes_stream();
            let mut buffer = BytesMut::new();

            while let Some(next) = body.next().await {
                let bytes = match next {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        error!("Streaming chat transport failed: {err}");
                        let _ = tx.send(StreamEvent::Failed).await;
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let line = buffer.split_to(newline + 1);
                    let line = match parse_stream_line(&line) {
                        Ok(Some(line)) => line,
                        Ok(None) => continue,
                        Err(err) => {
                            error!("Streaming chat returned an unreadable line: {err}");
                            let _ = tx.send(StreamEvent::Failed).await;
                            return;
                        }
                    };

                    let done = line.done;
                    let content = line.message.map(|m| m.content).unwrap_or_default();
                    if !content.is_empty()
                        && tx.send(StreamEvent::Chunk(content)).await.is_err()
                    {
                        // Receiver gone: the query was superseded.
                        return;
                    }

                    if done {
                        info!("Completed streaming reply from model backend");
                        let _ = tx.send(StreamEvent::Done).await;
                        return;
                    }
                }
            }

            // Body ended without the terminal `done` line.
            warn!("Streaming chat ended without a completion marker");
            let _ = tx.send(StreamEvent::Done).await;
        });

        rx
    }
}

fn parse_stream_line(line: &[u8]) -> Result<Option<ChatStreamLine>> {
    let text = std::str::from_utf8(line)
        .map_err(|err| anyhow!("stream line is not UTF-8: {err}"))?
        .trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|err| anyhow!("stream line is not valid JSON: {err}"))
}

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AssistantConfig,
    db::Database,
    events::{AssistantEvent, EventSender},
    ollama::{CompletionOutcome, OllamaClient, StreamEvent},
};

use super::context::{compose_prompt, time_range_label, SelectedContext};

/// Shown in place of a reply when the backend call fails partway.
pub const GATEWAY_ERROR_TEXT: &str = "Error communicating with the assistant.";

/// One user submission travelling through the pipeline.
#[derive(Debug, Clone)]
struct QueryRequest {
    id: Uuid,
    query_text: String,
    submitted_at: DateTime<Utc>,
    generation: u64,
}

/// Turns one submitted query into a prompt and a relayed reply stream.
///
/// Each submission runs on its own worker task. Workers own no display
/// state; everything reaches the shell through the event channel. A
/// generation counter tags each worker so that a superseded worker stops
/// relaying instead of interleaving into the newer conversation.
#[derive(Clone)]
pub struct QueryPipeline {
    db: Database,
    gateway: OllamaClient,
    config: Arc<AssistantConfig>,
    events: EventSender,
    generation: Arc<AtomicU64>,
}

impl QueryPipeline {
    pub fn new(
        db: Database,
        gateway: OllamaClient,
        config: Arc<AssistantConfig>,
        events: EventSender,
    ) -> Self {
        Self {
            db,
            gateway,
            config,
            events,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handles one submission from the shell. Empty input hides the popup
    /// and touches neither the store nor the backend.
    pub fn submit(&self, raw_query: &str) {
        let query = raw_query.trim();
        if query.is_empty() {
            info!("No query entered");
            let _ = self.events.send(AssistantEvent::Hide);
            return;
        }

        let request = QueryRequest {
            id: Uuid::new_v4(),
            query_text: query.to_string(),
            submitted_at: Utc::now(),
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        };
        info!(
            "Query {} submitted (generation {})",
            request.id, request.generation
        );

        let worker = self.clone();
        tokio::spawn(async move {
            worker.process_query(request).await;
        });
    }

    /// Non-streaming variant: one fixed lookback window, no widening. A
    /// store failure here is fatal to the request.
    pub async fn one_shot(&self, query: &str) -> Result<CompletionOutcome> {
        let interval = self.config.interval_seconds;
        let records = self.db.fetch_recent_captures(interval).await?;
        let context = if records.is_empty() {
            SelectedContext::empty()
        } else {
            SelectedContext::from_records(interval, &records)
        };

        let prompt = compose_prompt(&self.config.system_prompt, &context.text, query);
        Ok(self.gateway.complete(&prompt).await)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn process_query(&self, request: QueryRequest) {
        let context = self.select_context(request.generation).await;
        if !self.is_current(request.generation) {
            debug!("Query {} superseded during context selection", request.id);
            return;
        }

        let prompt = compose_prompt(&self.config.system_prompt, &context.text, &request.query_text);
        debug!("Prompt for query {}:\n{prompt}", request.id);

        let mut stream = self.gateway.stream(&prompt);
        let mut full_reply = String::new();

        while let Some(event) = stream.recv().await {
            if !self.is_current(request.generation) {
                debug!("Query {} superseded mid-stream, dropping it", request.id);
                return;
            }

            match event {
                StreamEvent::Chunk(part) => {
                    full_reply.push_str(&part);
                    if self.events.send(AssistantEvent::ReplyChunk(part)).is_err() {
                        return;
                    }
                }
                StreamEvent::Done => break,
                StreamEvent::Failed => {
                    let _ = self
                        .events
                        .send(AssistantEvent::ReplyComplete(GATEWAY_ERROR_TEXT.to_string()));
                    return;
                }
            }
        }

        let elapsed_ms = (Utc::now() - request.submitted_at).num_milliseconds();
        info!(
            "Query {} answered with {} characters in {elapsed_ms}ms",
            request.id,
            full_reply.len()
        );
        let _ = self.events.send(AssistantEvent::ReplyComplete(full_reply));
    }

    /// Widening-window scan: the smallest interval with any records wins,
    /// and windows are never merged. A store failure for one interval counts
    /// as an empty window and the scan keeps widening.
    async fn select_context(&self, generation: u64) -> SelectedContext {
        for &interval in &self.config.widening_intervals {
            if !self.is_current(generation) {
                return SelectedContext::empty();
            }

            let records = match self.db.fetch_recent_captures(interval).await {
                Ok(records) => records,
                Err(err) => {
                    warn!("Capture store read failed for the last {interval}s window: {err:#}");
                    Vec::new()
                }
            };

            if records.is_empty() {
                info!("No context found for interval {interval} seconds");
                let _ = self.events.send(AssistantEvent::ContextSelected {
                    time_range: time_range_label(interval),
                    word_count: 0,
                });
                continue;
            }

            let context = SelectedContext::from_records(interval, &records);
            info!(
                "Using context from the last {interval} seconds with length {} words",
                context.word_count
            );
            let _ = self.events.send(AssistantEvent::ContextSelected {
                time_range: context.time_range.clone(),
                word_count: context.word_count,
            });
            return context;
        }

        info!("No recent context found after all attempts");
        SelectedContext::empty()
    }
}

pub mod config;
pub mod db;
pub mod events;
pub mod ollama;
pub mod pipeline;

pub use config::AssistantConfig;
pub use db::{CaptureRecord, Database};
pub use events::{AssistantEvent, EventReceiver, EventSender};
pub use ollama::{CompletionOutcome, OllamaClient, StreamEvent};
pub use pipeline::QueryPipeline;

//! Presentation boundary.
//!
//! The pipeline never touches display state. It sends these events over a
//! channel; the shell's single consumer renders them. `ReplyChunk` appends
//! to the reply being shown, `ReplyComplete` replaces it wholesale.

use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum AssistantEvent {
    ReplyChunk(String),
    ReplyComplete(String),
    ContextSelected {
        time_range: String,
        word_count: usize,
    },
    /// Submitted input was empty; the popup should hide.
    Hide,
}

pub type EventSender = mpsc::UnboundedSender<AssistantEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AssistantEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

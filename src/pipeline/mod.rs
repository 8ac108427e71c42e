pub mod context;
pub mod controller;

pub use context::{compose_prompt, join_texts, time_range_label, word_count, SelectedContext};
pub use controller::{QueryPipeline, GATEWAY_ERROR_TEXT};

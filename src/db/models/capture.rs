//! Capture record data model.
//!
//! Represents one row of on-screen text written by the external
//! screen-capture process. Records are append-only and never mutated or
//! deleted from this side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub frame_id: i64,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub language_id: String,
}

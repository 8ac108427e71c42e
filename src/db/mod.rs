pub mod connection;
pub mod helpers;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::CaptureRecord;

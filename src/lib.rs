// src/lib.rs
// Public library surface for integration tests and the service binary.

// Analytics core (pure, no I/O)
pub mod tokenize;
pub mod sentiment;
pub mod keywords;
pub mod weeks;
pub mod ratings;
pub mod suggestions;
pub mod trend;
pub mod engine;

// Domain records and write-path tagging
pub mod models;
pub mod ingest;
pub mod loyalty;

// Service layer
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::engine::{AnalyticsEngine, AnalyticsSummary, SummaryOptions};
pub use crate::models::{FeedbackRecord, Ratings};
pub use crate::sentiment::{SentimentAnalyzer, SentimentLabel};
pub use crate::weeks::{Clock, FixedClock, SystemClock, WeekLabel};

//! Synth Source
//!
//! A pull-based source of synthetic change records, for load-testing
//! pipelines and exercising connectors without a real upstream system.
//!
//! # Features
//!
//! - Several collections, each with its own operations and payload format
//! - Raw (JSON-encoded), structured, or file-backed payloads
//! - Token-bucket rate limiting
//! - Burst mode alternating generating and sleeping windows
//! - An optional record ceiling
//!
//! # Usage
//!
//! ```rust,no_run
//! use synth_source::{Config, Source};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("source.yaml")?;
//! let mut source = Source::build(config)?;
//! let cancel = CancellationToken::new();
//!
//! let record = source.pull(&cancel).await?;
//! source.ack(&record.position);
//! # Ok(())
//! # }
//! ```
//!
//! Record types live in `record_core` and synthesis in `record_generator`;
//! both are re-exported here.

pub mod burst;
pub mod config;
pub mod error;
pub mod output;
pub mod rate_limit;
pub mod source;
mod wait;

pub use burst::BurstScheduler;
pub use config::{BurstConfig, CollectionConfig, Config, ConfigError, FormatConfig, FormatType};
pub use error::{Cancelled, SourceError};
pub use rate_limit::RateLimiter;
pub use source::{Source, SourceBuilder, SourceMetrics};

pub use record_core;
pub use record_generator;

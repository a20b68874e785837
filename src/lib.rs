//! # videoparser
//!
//! Resolves short video ids into playable media information and serves
//! the result over a small caching HTTP front end.
//!
//! ## Features
//!
//! - Several upstream access strategies tried in order with fallback
//! - Signature deciphering by shape-matching the player script
//! - Time-bounded in-memory caching of bodies, metadata and stream targets
//! - Byte-range proxying of resolved streams
//!
//! ## Example
//!
//! ```rust,no_run
//! use videoparser::{ResolverContext, ResolverOptions, VideoParser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ResolverContext::http(ResolverOptions::default())?;
//!     let parser = VideoParser::new(ctx);
//!
//!     let info = parser.info("dQw4w9WgXcQ").await?;
//!     println!("{} by {}", info.title, info.author);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod platform;
pub mod server;
pub mod utils;

// Re-export main types
pub use core::{
    ResolverContext, ResolverOptions, SoftDenialPolicy, StreamDescriptor, StreamTarget,
    VideoMetadata, VideoParser,
};
pub use error::{ExtractionError, ParserError};

/// Result type alias for videoparser operations
pub type Result<T> = std::result::Result<T, ParserError>;

//! Main entry point for the videoparser CLI

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use videoparser::cli::{Args, Command, VerbosityLevel};
use videoparser::server::{self, ServerState};
use videoparser::utils::url::extract_video_id;
use videoparser::{ResolverContext, VideoParser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbosity_level());

    debug!("Starting videoparser with args: {:?}", args);

    let ctx = ResolverContext::http(args.resolver_options())
        .context("failed to build HTTP transport")?;

    match &args.command {
        Command::Serve {
            listen,
            expose_urls,
        } => {
            let state = Arc::new(ServerState::new(ctx, *expose_urls));
            server::serve(*listen, state).await?;
        }
        Command::Info { video, itag } => {
            let video_id = extract_video_id(video)?;
            let parser = VideoParser::new(ctx);
            let output = match itag {
                Some(tag) => serde_json::to_string_pretty(&parser.info_part(&video_id, tag).await?)?,
                None => {
                    let metadata = parser.info(&video_id).await?;
                    if metadata.is_restricted() {
                        warn!(
                            "{} is restricted: {}",
                            video_id,
                            metadata.error.as_deref().unwrap_or_default()
                        );
                    }
                    serde_json::to_string_pretty(&metadata)?
                }
            };
            info!("Resolved {}", video_id);
            println!("{output}");
        }
    }

    Ok(())
}

/// Initialize logging system
fn init_logging(level: VerbosityLevel) {
    // RUST_LOG wins over the verbosity flags
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

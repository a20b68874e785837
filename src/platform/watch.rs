//! Watch page strategy
//!
//! Scrapes the embedded player response and the path of the current player
//! script from the public watch page. This is the only strategy that
//! discovers the player asset version; it records it for the others.

use crate::core::context::ResolverContext;
use crate::error::ParserError;
use crate::platform::resolver::{PlayerResponse, Resolution, Resolver, StrategyKind};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct WatchPageResolver;

/// Path of the player script referenced by a watch page
pub fn scrape_asset_version(html: &str) -> Result<Option<String>, ParserError> {
    let js_url = Regex::new(r#""jsUrl":"(/s/player.*?base\.js)""#)?;
    Ok(js_url
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string()))
}

/// Player response JSON embedded in a watch page
pub fn scrape_player_response(html: &str) -> Result<&str, ParserError> {
    let marker = Regex::new(r"ytInitialPlayerResponse\s+=\s+(.*\}{3,});\s*var")?;
    marker
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ParserError::InvalidResponse("player response not found in watch page".to_string()))
}

#[async_trait]
impl Resolver for WatchPageResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WatchPage
    }

    async fn resolve(&self, ctx: &ResolverContext, video_id: &str) -> Result<Resolution, ParserError> {
        let url = format!("{}/watch?v={}", ctx.options().endpoints.base_url, video_id);
        info!("Fetching watch page for video ID: {}", video_id);
        let html = ctx.fetch_text_cached(&url).await?;

        let asset_version = scrape_asset_version(&html)?;
        match &asset_version {
            Some(version) => ctx.players().record(version),
            None => debug!("No player script referenced by {}", url),
        }

        let json = scrape_player_response(&html)?;
        PlayerResponse::from_json(json)?.into_resolution(
            video_id,
            self.kind(),
            asset_version.or_else(|| ctx.players().current()),
        )
    }
}

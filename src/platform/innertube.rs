//! Internal player API strategy

use crate::core::context::{ResolverContext, ResolverOptions};
use crate::error::ParserError;
use crate::platform::resolver::{PlayerResponse, Resolution, Resolver, StrategyKind};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

/// Resolves through a single POST to the internal player endpoint
#[derive(Debug, Default, Clone, Copy)]
pub struct InnerTubeResolver;

impl InnerTubeResolver {
    /// Request payload carrying the configured client identity
    pub fn request_body(options: &ResolverOptions, video_id: &str) -> serde_json::Value {
        json!({
            "videoId": video_id,
            "context": {
                "client": {
                    "hl": options.language,
                    "gl": options.region,
                    "clientName": options.client_name,
                    "clientVersion": options.client_version,
                }
            }
        })
    }
}

#[async_trait]
impl Resolver for InnerTubeResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::InternalApi
    }

    async fn resolve(&self, ctx: &ResolverContext, video_id: &str) -> Result<Resolution, ParserError> {
        info!("Fetching player response for video ID: {}", video_id);
        let options = ctx.options();
        let body = Self::request_body(options, video_id);
        let text = ctx
            .post_json_cached(
                &options.endpoints.player_api_url,
                &body,
                &format!("player:{video_id}"),
            )
            .await?;

        PlayerResponse::from_json(&text)?.into_resolution(
            video_id,
            self.kind(),
            ctx.players().current(),
        )
    }
}

//! Legacy info endpoint strategy

use crate::core::context::ResolverContext;
use crate::error::ParserError;
use crate::platform::resolver::{PlayerResponse, Resolution, Resolver, StrategyKind};
use crate::utils::url::parse_query;
use async_trait::async_trait;
use tracing::info;

/// Reads the form-encoded `get_video_info` endpoint. It never exposes the
/// player asset version, so the one recorded by earlier strategies is reused.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyInfoResolver;

impl LegacyInfoResolver {
    pub fn endpoint(base_url: &str, video_id: &str) -> String {
        format!("{base_url}/get_video_info?video_id={video_id}&el=detailpage&html5=1")
    }
}

#[async_trait]
impl Resolver for LegacyInfoResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LegacyInfo
    }

    async fn resolve(&self, ctx: &ResolverContext, video_id: &str) -> Result<Resolution, ParserError> {
        let url = Self::endpoint(&ctx.options().endpoints.base_url, video_id);
        info!("Fetching legacy info for video ID: {}", video_id);
        let body = ctx.fetch_text_cached(&url).await?;
        let mut fields = parse_query(&body);

        if fields.get("status").map(String::as_str) == Some("fail") {
            let reason = fields
                .remove("reason")
                .unwrap_or_else(|| "get_video_info failed".to_string());
            return Err(ParserError::InvalidResponse(reason));
        }

        let json = fields
            .remove("player_response")
            .ok_or_else(|| ParserError::InvalidResponse("missing player_response".to_string()))?;

        PlayerResponse::from_json(&json)?.into_resolution(
            video_id,
            self.kind(),
            ctx.players().current(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ResolverOptions;
    use crate::platform::client::MockTransport;
    use std::sync::Arc;

    fn ctx_with(body: &str) -> ResolverContext {
        let url = LegacyInfoResolver::endpoint("https://www.youtube.com", "vidBBBBBBBB");
        ResolverContext::new(
            Arc::new(MockTransport::new().with_get(&url, body)),
            ResolverOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_decodes_player_response() {
        let player = r#"{"playabilityStatus":{"status":"OK"},"videoDetails":{"title":"Legacy title","author":"A","lengthSeconds":"3"},"streamingData":{"formats":[]}}"#;
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("status", "ok")
            .append_pair("player_response", player)
            .finish();
        let ctx = ctx_with(&body);

        let resolution = LegacyInfoResolver.resolve(&ctx, "vidBBBBBBBB").await.unwrap();
        assert_eq!(resolution.metadata.title, "Legacy title");
        assert_eq!(resolution.metadata.id, "vidBBBBBBBB");
        assert_eq!(resolution.asset_version, None);
    }

    #[tokio::test]
    async fn test_status_fail() {
        let ctx = ctx_with("status=fail&reason=Video+unavailable");
        let err = LegacyInfoResolver.resolve(&ctx, "vidBBBBBBBB").await.unwrap_err();
        match err {
            ParserError::InvalidResponse(reason) => assert_eq!(reason, "Video unavailable"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_player_response() {
        let ctx = ctx_with("status=ok");
        assert!(matches!(
            LegacyInfoResolver.resolve(&ctx, "vidBBBBBBBB").await,
            Err(ParserError::InvalidResponse(_))
        ));
    }
}

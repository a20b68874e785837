//! Resolution orchestrator

use crate::core::context::{ResolverContext, SoftDenialPolicy};
use crate::core::video_info::{StreamTarget, VideoMetadata};
use crate::error::ParserError;
use crate::platform::innertube::InnerTubeResolver;
use crate::platform::legacy::LegacyInfoResolver;
use crate::platform::resolver::{Resolution, Resolver, StrategyKind};
use crate::platform::signature::{build_url, ScriptCipher};
use crate::platform::watch::WatchPageResolver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Resolver implementing `kind`
pub fn resolver_for(kind: StrategyKind) -> Box<dyn Resolver> {
    match kind {
        StrategyKind::InternalApi => Box::new(InnerTubeResolver),
        StrategyKind::WatchPage => Box::new(WatchPageResolver),
        StrategyKind::LegacyInfo => Box::new(LegacyInfoResolver),
    }
}

/// Tries each strategy in order until one resolves the video.
///
/// A parser is meant to live for one external request: successful
/// resolutions are memoized on it, so asking for full info and then for a
/// single stream does not hit the network twice.
pub struct VideoParser {
    ctx: ResolverContext,
    resolvers: Vec<Box<dyn Resolver>>,
    resolved: Mutex<HashMap<String, Arc<Resolution>>>,
}

impl VideoParser {
    /// Create a new parser using the strategies configured on `ctx`
    pub fn new(ctx: ResolverContext) -> Self {
        let resolvers = ctx
            .options()
            .strategies
            .iter()
            .copied()
            .map(resolver_for)
            .collect();
        Self::with_resolvers(ctx, resolvers)
    }

    pub fn with_resolvers(ctx: ResolverContext, resolvers: Vec<Box<dyn Resolver>>) -> Self {
        Self {
            ctx,
            resolvers,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &ResolverContext {
        &self.ctx
    }

    fn memoized(&self, video_id: &str) -> Option<Arc<Resolution>> {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(video_id)
            .cloned()
    }

    /// Resolve `video_id`, falling back through the strategies in order
    pub async fn resolve(&self, video_id: &str) -> Result<Arc<Resolution>, ParserError> {
        if let Some(resolution) = self.memoized(video_id) {
            return Ok(resolution);
        }

        let mut last_error = None;
        for resolver in &self.resolvers {
            debug!("Trying {} strategy for {}", resolver.kind(), video_id);
            match resolver.resolve(&self.ctx, video_id).await {
                Ok(resolution) => {
                    info!("Resolved {} via {} strategy", video_id, resolver.kind());
                    let resolution = Arc::new(resolution);
                    self.resolved
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(video_id.to_string(), resolution.clone());
                    return Ok(resolution);
                }
                Err(e) => {
                    warn!("{} strategy failed for {}: {}", resolver.kind(), video_id, e);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .unwrap_or_else(|| ParserError::InvalidResponse("no strategies configured".to_string()));
        Err(ParserError::AllStrategiesFailed(Box::new(last)))
    }

    fn builds_urls(&self, resolution: &Resolution) -> bool {
        !resolution.soft_denied || self.ctx.options().soft_denial == SoftDenialPolicy::BuildUrls
    }

    /// Full info with every stream url built
    pub async fn info(&self, video_id: &str) -> Result<VideoMetadata, ParserError> {
        let resolution = self.resolve(video_id).await?;
        let mut metadata = resolution.metadata.clone();
        if !self.builds_urls(&resolution) {
            debug!("Skipping url construction for soft-denied {}", video_id);
            return Ok(metadata);
        }

        let ciphers = ScriptCipher::new(&self.ctx, resolution.asset_version.as_deref());
        for (tag, format) in &resolution.formats {
            let url = build_url(format, &ciphers).await?;
            if let Some(stream) = metadata.streams.get_mut(tag) {
                stream.url = Some(url);
            }
        }
        Ok(metadata)
    }

    /// Url of a single stream; other streams are left alone
    pub async fn info_part(&self, video_id: &str, tag: &str) -> Result<StreamTarget, ParserError> {
        let resolution = self.resolve(video_id).await?;
        let format = resolution
            .formats
            .get(tag)
            .ok_or_else(|| ParserError::FormatNotFound(tag.to_string()))?;

        let url = if self.builds_urls(&resolution) {
            let ciphers = ScriptCipher::new(&self.ctx, resolution.asset_version.as_deref());
            Some(build_url(format, &ciphers).await?)
        } else {
            None
        };

        Ok(StreamTarget {
            tag: tag.to_string(),
            url,
        })
    }
}

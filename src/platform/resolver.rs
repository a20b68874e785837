//! Resolver strategy interface and the player response shared by every strategy

use crate::core::context::ResolverContext;
use crate::core::video_info::VideoMetadata;
use crate::error::ParserError;
use crate::platform::formats::{index_formats, RawFormat};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Upstream surface a strategy reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    InternalApi,
    WatchPage,
    LegacyInfo,
}

impl StrategyKind {
    /// Internal API first, then the watch page, then the legacy endpoint
    pub fn default_order() -> Vec<StrategyKind> {
        vec![
            StrategyKind::InternalApi,
            StrategyKind::WatchPage,
            StrategyKind::LegacyInfo,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::InternalApi => "api",
            StrategyKind::WatchPage => "watch",
            StrategyKind::LegacyInfo => "legacy",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "internal-api" | "innertube" => Ok(StrategyKind::InternalApi),
            "watch" | "watch-page" => Ok(StrategyKind::WatchPage),
            "legacy" | "legacy-info" => Ok(StrategyKind::LegacyInfo),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// Normalized metadata plus the raw formats needed to build urls later
#[derive(Debug, Clone)]
pub struct Resolution {
    pub metadata: VideoMetadata,
    pub formats: BTreeMap<String, RawFormat>,
    /// Player asset version to decipher signatures with
    pub asset_version: Option<String>,
    pub strategy: StrategyKind,
    pub soft_denied: bool,
}

/// One way of turning a video id into a [`Resolution`]
#[async_trait]
pub trait Resolver: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn resolve(&self, ctx: &ResolverContext, video_id: &str) -> Result<Resolution, ParserError>;
}

/// Player response JSON, as returned by every upstream surface
#[derive(Debug, Deserialize)]
pub struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(rename = "videoDetails")]
    pub video_details: Option<VideoDetails>,
    #[serde(rename = "streamingData")]
    pub streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoDetails {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "lengthSeconds", default)]
    pub length_seconds: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamingData {
    #[serde(default)]
    pub formats: Vec<RawFormat>,
    #[serde(rename = "adaptiveFormats", default)]
    pub adaptive_formats: Vec<RawFormat>,
}

/// Playability verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playability {
    Playable,
    /// Partial metadata is still usable
    SoftDenied(String),
    HardDenied { status: String, reason: String },
}

impl PlayabilityStatus {
    pub fn classify(&self) -> Playability {
        let reason = || self.reason.clone().unwrap_or_else(|| self.status.clone());
        match self.status.as_str() {
            "OK" => Playability::Playable,
            "UNPLAYABLE" | "AGE_CHECK_REQUIRED" | "CONTENT_CHECK_REQUIRED"
            | "LIVE_STREAM_OFFLINE" => Playability::SoftDenied(reason()),
            _ => Playability::HardDenied {
                status: self.status.clone(),
                reason: reason(),
            },
        }
    }
}

impl PlayerResponse {
    pub fn from_json(text: &str) -> Result<Self, ParserError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate playability and normalize into a [`Resolution`]
    pub fn into_resolution(
        self,
        video_id: &str,
        strategy: StrategyKind,
        asset_version: Option<String>,
    ) -> Result<Resolution, ParserError> {
        let status = self
            .playability_status
            .ok_or_else(|| ParserError::InvalidResponse("missing playabilityStatus".to_string()))?;

        let soft_reason = match status.classify() {
            Playability::Playable => None,
            Playability::SoftDenied(reason) => {
                warn!("{} soft-denied by {}: {}", video_id, strategy, reason);
                Some(reason)
            }
            Playability::HardDenied { status, reason } => {
                return Err(ParserError::Playability { status, reason });
            }
        };

        let details = self
            .video_details
            .ok_or_else(|| ParserError::InvalidResponse("missing videoDetails".to_string()))?;

        let streaming = match (self.streaming_data, &soft_reason) {
            (Some(data), _) => data,
            (None, Some(_)) => StreamingData::default(),
            (None, None) => {
                return Err(ParserError::InvalidResponse(
                    "missing streamingData".to_string(),
                ))
            }
        };

        let formats = index_formats([
            streaming.formats.as_slice(),
            streaming.adaptive_formats.as_slice(),
        ]);

        let mut metadata = VideoMetadata::new(
            details.video_id.unwrap_or_else(|| video_id.to_string()),
            details.title,
        );
        metadata.author = details.author;
        metadata.duration = details.length_seconds.parse().unwrap_or(0);
        metadata.streams = formats
            .iter()
            .map(|(tag, raw)| (tag.clone(), raw.to_descriptor()))
            .collect();
        metadata.error = soft_reason.clone();

        debug!(
            "{} resolved by {} with {} formats",
            video_id,
            strategy,
            formats.len()
        );

        Ok(Resolution {
            metadata,
            formats,
            asset_version,
            strategy,
            soft_denied: soft_reason.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> PlayerResponse {
        serde_json::from_value(value).unwrap()
    }

    fn details() -> serde_json::Value {
        json!({"videoId": "abc123XYZ_-", "title": "T", "author": "A", "lengthSeconds": "61"})
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!("api".parse::<StrategyKind>(), Ok(StrategyKind::InternalApi));
        assert_eq!("watch-page".parse::<StrategyKind>(), Ok(StrategyKind::WatchPage));
        assert_eq!("Legacy".parse::<StrategyKind>(), Ok(StrategyKind::LegacyInfo));
        assert!("rss".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::WatchPage.to_string(), "watch");
    }

    #[test]
    fn test_classify() {
        let status = |s: &str| PlayabilityStatus {
            status: s.to_string(),
            reason: Some("because".to_string()),
        };
        assert_eq!(status("OK").classify(), Playability::Playable);
        assert_eq!(
            status("AGE_CHECK_REQUIRED").classify(),
            Playability::SoftDenied("because".to_string())
        );
        assert!(matches!(
            status("LOGIN_REQUIRED").classify(),
            Playability::HardDenied { .. }
        ));
        assert!(matches!(
            status("SOMETHING_NEW").classify(),
            Playability::HardDenied { .. }
        ));
    }

    #[test]
    fn test_ok_response() {
        let resolution = response(json!({
            "playabilityStatus": {"status": "OK"},
            "videoDetails": details(),
            "streamingData": {
                "formats": [{"itag": 18, "url": "https://r1.example/18", "mimeType": "video/mp4", "quality": "medium", "qualityLabel": "360p"}],
                "adaptiveFormats": [{"itag": 140, "url": "https://r1.example/140", "mimeType": "audio/mp4", "quality": "tiny"}]
            }
        }))
        .into_resolution("abc123XYZ_-", StrategyKind::InternalApi, None)
        .unwrap();

        assert_eq!(resolution.metadata.duration, 61);
        assert_eq!(resolution.metadata.author, "A");
        assert_eq!(resolution.metadata.streams.len(), 2);
        assert_eq!(resolution.metadata.streams["18"].quality, "360p");
        assert!(resolution.metadata.streams["18"].url.is_none());
        assert!(!resolution.soft_denied);
    }

    #[test]
    fn test_soft_denial_keeps_metadata() {
        let resolution = response(json!({
            "playabilityStatus": {"status": "UNPLAYABLE", "reason": "Not available in your country"},
            "videoDetails": details()
        }))
        .into_resolution("abc123XYZ_-", StrategyKind::WatchPage, None)
        .unwrap();

        assert!(resolution.soft_denied);
        assert_eq!(
            resolution.metadata.error.as_deref(),
            Some("Not available in your country")
        );
        assert_eq!(resolution.metadata.title, "T");
        assert!(resolution.formats.is_empty());
    }

    #[test]
    fn test_hard_denial_fails() {
        let err = response(json!({
            "playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in"},
            "videoDetails": details()
        }))
        .into_resolution("abc123XYZ_-", StrategyKind::InternalApi, None)
        .unwrap_err();

        match err {
            ParserError::Playability { status, reason } => {
                assert_eq!(status, "LOGIN_REQUIRED");
                assert_eq!(reason, "Sign in");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_responses() {
        let missing_status = response(json!({"videoDetails": details()}))
            .into_resolution("x", StrategyKind::InternalApi, None);
        assert!(matches!(missing_status, Err(ParserError::InvalidResponse(_))));

        let missing_details = response(json!({"playabilityStatus": {"status": "OK"}, "streamingData": {}}))
            .into_resolution("x", StrategyKind::InternalApi, None);
        assert!(matches!(missing_details, Err(ParserError::InvalidResponse(_))));

        let missing_streams = response(json!({"playabilityStatus": {"status": "OK"}, "videoDetails": details()}))
            .into_resolution("x", StrategyKind::InternalApi, None);
        assert!(matches!(missing_streams, Err(ParserError::InvalidResponse(_))));
    }
}

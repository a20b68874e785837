//! Video information structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved video metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video ID
    pub id: String,
    /// Video title
    pub title: String,
    /// Video duration in seconds
    pub duration: u64,
    /// Video author/channel name
    pub author: String,
    /// Stream descriptors keyed by itag
    pub streams: BTreeMap<String, StreamDescriptor>,
    /// Soft-denial reason reported by the platform
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl VideoMetadata {
    /// Create a new VideoMetadata
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration: 0,
            author: String::new(),
            streams: BTreeMap::new(),
            error: None,
        }
    }

    /// Whether the platform reported a soft denial
    pub fn is_restricted(&self) -> bool {
        self.error.is_some()
    }

    /// Copy of the metadata with every stream url removed
    pub fn without_urls(&self) -> Self {
        let mut copy = self.clone();
        for stream in copy.streams.values_mut() {
            stream.url = None;
        }
        copy
    }
}

/// One quality/encoding variant of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Quality label, e.g. `720p` or `medium`
    pub quality: String,
    /// Normalized mime type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Format tag
    pub itag: String,
    /// Content length in bytes as reported upstream
    #[serde(rename = "len", skip_serializing_if = "Option::is_none", default)]
    pub content_length: Option<String>,
    #[serde(rename = "initRange", skip_serializing_if = "Option::is_none", default)]
    pub init_range: Option<ByteRange>,
    #[serde(rename = "indexRange", skip_serializing_if = "Option::is_none", default)]
    pub index_range: Option<ByteRange>,
    /// Playable URL, populated on demand
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
}

/// Inclusive byte range as reported upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: String,
    pub end: String,
}

/// Resolved target of a single stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTarget {
    pub tag: String,
    pub url: Option<String>,
}

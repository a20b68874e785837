//! MIME type utilities for stream descriptors and thumbnails

/// Normalize an upstream mime type; `+` separators become spaces
///
/// `video/mp4;+codecs="avc1.42001E,+mp4a.40.2"` becomes
/// `video/mp4; codecs="avc1.42001E, mp4a.40.2"`.
pub fn normalize_mime_type(mime_type: &str) -> String {
    mime_type.replace('+', " ")
}

/// Supported thumbnail encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailKind {
    Jpeg,
    Webp,
}

impl ThumbnailKind {
    pub fn from_ext(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.') {
            "jpg" => Some(ThumbnailKind::Jpeg),
            "webp" => Some(ThumbnailKind::Webp),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ThumbnailKind::Jpeg => "image/jpeg",
            ThumbnailKind::Webp => "image/webp",
        }
    }

    /// Upstream path of the medium-quality thumbnail for `id`
    pub fn upstream_path(self, id: &str) -> String {
        match self {
            ThumbnailKind::Jpeg => format!("/vi/{id}/mqdefault.jpg"),
            ThumbnailKind::Webp => format!("/vi_webp/{id}/mqdefault.webp"),
        }
    }
}

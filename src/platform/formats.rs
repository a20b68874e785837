//! Raw upstream format entries and their normalization

use crate::core::video_info::{ByteRange, StreamDescriptor};
use crate::utils::mime::normalize_mime_type;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One entry of `formats` / `adaptiveFormats` as sent by the platform
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFormat {
    pub itag: u32,
    pub url: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    pub quality: Option<String>,
    #[serde(rename = "qualityLabel")]
    pub quality_label: Option<String>,
    #[serde(rename = "contentLength")]
    pub content_length: Option<String>,
    #[serde(rename = "initRange")]
    pub init_range: Option<ByteRange>,
    #[serde(rename = "indexRange")]
    pub index_range: Option<ByteRange>,
    #[serde(rename = "signatureCipher")]
    pub signature_cipher: Option<String>,
    /// Older name of `signatureCipher`
    pub cipher: Option<String>,
}

impl RawFormat {
    pub fn tag(&self) -> String {
        self.itag.to_string()
    }

    /// Encoded cipher blob, whichever field carries it
    pub fn cipher_blob(&self) -> Option<&str> {
        self.signature_cipher
            .as_deref()
            .or(self.cipher.as_deref())
    }

    /// Normalized descriptor without a url
    pub fn to_descriptor(&self) -> StreamDescriptor {
        StreamDescriptor {
            quality: self
                .quality_label
                .clone()
                .or_else(|| self.quality.clone())
                .unwrap_or_default(),
            mime_type: normalize_mime_type(&self.mime_type),
            itag: self.tag(),
            content_length: self.content_length.clone(),
            init_range: self.init_range.clone(),
            index_range: self.index_range.clone(),
            url: None,
        }
    }
}

/// Key formats by tag; a later entry with a duplicate tag replaces the earlier one
pub fn index_formats<'a>(
    lists: impl IntoIterator<Item = &'a [RawFormat]>,
) -> BTreeMap<String, RawFormat> {
    let mut formats = BTreeMap::new();
    for list in lists {
        for format in list {
            formats.insert(format.tag(), format.clone());
        }
    }
    formats
}

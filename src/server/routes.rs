//! Inbound path parsing

use crate::utils::mime::ThumbnailKind;
use crate::utils::url::is_video_id;

/// A request the front end knows how to serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRoute {
    /// `<id>.json`
    Info { id: String },
    /// `<id>/<itag>/<start>-<end>.ts`
    Segment {
        id: String,
        itag: String,
        start: u64,
        end: u64,
    },
    /// `<id>.jpg` or `<id>.webp`
    Thumbnail { id: String, kind: ThumbnailKind },
}

impl VideoRoute {
    /// Parse the part of the path after `/video/`
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_start_matches('/');
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            [file] => {
                let (id, ext) = file.rsplit_once('.')?;
                if !is_video_id(id) {
                    return None;
                }
                if ext == "json" {
                    return Some(VideoRoute::Info { id: id.to_string() });
                }
                ThumbnailKind::from_ext(ext).map(|kind| VideoRoute::Thumbnail {
                    id: id.to_string(),
                    kind,
                })
            }
            [id, itag, range] => {
                if !is_video_id(id) || !is_itag(itag) {
                    return None;
                }
                let (start, end) = range.strip_suffix(".ts")?.split_once('-')?;
                if !is_digits(start) || !is_digits(end) {
                    return None;
                }
                Some(VideoRoute::Segment {
                    id: id.to_string(),
                    itag: itag.to_string(),
                    start: start.parse().ok()?,
                    end: end.parse().ok()?,
                })
            }
            _ => None,
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_itag(s: &str) -> bool {
    s.len() <= 3 && is_digits(s)
}

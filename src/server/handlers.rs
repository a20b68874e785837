//! Request handlers turning resolver output into HTTP responses

use crate::core::parser::VideoParser;
use crate::core::video_info::StreamTarget;
use crate::error::ParserError;
use crate::platform::client::FetchedBody;
use crate::server::routes::VideoRoute;
use crate::server::ServerState;
use crate::utils::mime::ThumbnailKind;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const ERROR_MAX_AGE: &str = "public, max-age=3600";
const SEGMENT_HIT_MAX_AGE: &str = "public, max-age=864000";
const THUMBNAIL_MAX_AGE: &str = "public, max-age=604800";

/// Largest byte range proxied in one segment request
pub const MAX_SEGMENT_BYTES: u64 = 16 * 1024 * 1024;

/// Upstream headers copied onto proxied responses
const PASSTHROUGH_HEADERS: [HeaderName; 3] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_ENCODING,
];

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Headers of `fetched` that may be forwarded to the client
pub fn filter_headers(fetched: &FetchedBody) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = fetched.header(name.as_str()) {
            insert_header(&mut headers, name, value);
        }
    }
    headers
}

fn json_response(status: StatusCode, body: &serde_json::Value, cache_control: &str) -> Response {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, header::CONTENT_TYPE, "application/json");
    insert_header(&mut headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    insert_header(&mut headers, header::CACHE_CONTROL, cache_control);
    (status, headers, body.to_string()).into_response()
}

fn error_envelope(status: StatusCode, error: &ParserError, cache_control: &str) -> Response {
    json_response(
        status,
        &json!({"code": -1, "msg": error.to_string()}),
        cache_control,
    )
}

fn text_response(status: StatusCode, text: &'static str, cache_control: &str) -> Response {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, header::CONTENT_TYPE, "text/plain");
    insert_header(&mut headers, header::CACHE_CONTROL, cache_control);
    (status, headers, text).into_response()
}

/// Entry point for every `/video/...` request
pub async fn dispatch(State(state): State<Arc<ServerState>>, Path(path): Path<String>) -> Response {
    match VideoRoute::parse(&path) {
        Some(VideoRoute::Info { id }) => info(&state, &id).await,
        Some(VideoRoute::Segment {
            id,
            itag,
            start,
            end,
        }) => segment(&state, &id, &itag, start, end).await,
        Some(VideoRoute::Thumbnail { id, kind }) => thumbnail(&state, &id, kind).await,
        None => not_found().await,
    }
}

pub async fn not_found() -> Response {
    text_response(StatusCode::NOT_FOUND, "not found", "public, max-age=60")
}

async fn info(state: &ServerState, id: &str) -> Response {
    let started = Instant::now();
    let caches = state.ctx.caches();
    let key = id.to_string();

    let result = match caches.info.get(&key) {
        Some(metadata) => Ok(metadata),
        None => {
            let parser = VideoParser::new(state.ctx.clone());
            parser.info(id).await.inspect(|metadata| {
                caches.info.set(key.clone(), metadata.clone());
            })
        }
    };

    match result {
        Ok(metadata) => {
            let public = if state.expose_urls {
                metadata
            } else {
                metadata.without_urls()
            };
            let elapsed = started.elapsed().as_millis();
            match serde_json::to_value(&public) {
                Ok(body) => json_response(
                    StatusCode::OK,
                    &body,
                    &format!("public, max-age=9999{elapsed}"),
                ),
                Err(e) => error_envelope(StatusCode::OK, &e.into(), ERROR_MAX_AGE),
            }
        }
        Err(e) => {
            warn!("Info for {} failed: {}", id, e);
            error_envelope(StatusCode::OK, &e, ERROR_MAX_AGE)
        }
    }
}

async fn segment(state: &ServerState, id: &str, itag: &str, start: u64, end: u64) -> Response {
    if end < start || end - start >= MAX_SEGMENT_BYTES {
        debug!("Rejecting range {}-{} for {}/{}", start, end, id, itag);
        return text_response(
            StatusCode::RANGE_NOT_SATISFIABLE,
            "invalid range",
            "public, max-age=1",
        );
    }

    let started = Instant::now();
    let caches = state.ctx.caches();
    let key = format!("{id}/{itag}");

    let (target, hit) = match caches.streams.get(&key) {
        Some(target) => (target, true),
        None => {
            let parser = VideoParser::new(state.ctx.clone());
            match parser.info_part(id, itag).await {
                Ok(target) => (target, false),
                Err(e) => {
                    warn!("Stream {} failed: {}", key, e);
                    return error_envelope(StatusCode::INTERNAL_SERVER_ERROR, &e, ERROR_MAX_AGE);
                }
            }
        }
    };
    let parse_ms = started.elapsed().as_millis();

    let StreamTarget { url: Some(url), .. } = &target else {
        return text_response(StatusCode::INTERNAL_SERVER_ERROR, "invalid url", "public, max-age=1");
    };
    if !hit {
        caches.streams.set(key.clone(), target.clone());
    }

    let upstream = format!("{url}&range={start}-{end}");
    debug!("Proxying {} from {}", key, upstream);
    match state.ctx.transport().get(&upstream, &[]).await {
        Ok(fetched) => {
            let mut headers = filter_headers(&fetched);
            let cache_control = if hit {
                SEGMENT_HIT_MAX_AGE.to_string()
            } else {
                format!("public, max-age={}99{}", parse_ms, started.elapsed().as_millis())
            };
            insert_header(&mut headers, header::CACHE_CONTROL, &cache_control);
            insert_header(&mut headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
            let status = StatusCode::from_u16(fetched.status).unwrap_or(StatusCode::OK);
            (status, headers, fetched.body).into_response()
        }
        Err(e) => {
            warn!("Upstream fetch for {} failed: {}", key, e);
            error_envelope(StatusCode::BAD_GATEWAY, &e, "public, max-age=1")
        }
    }
}

async fn thumbnail(state: &ServerState, id: &str, kind: ThumbnailKind) -> Response {
    let url = format!(
        "{}{}",
        state.ctx.options().endpoints.thumbnail_base_url,
        kind.upstream_path(id)
    );
    match state.ctx.transport().get(&url, &[]).await {
        Ok(fetched) => {
            let mut headers = HeaderMap::new();
            insert_header(
                &mut headers,
                header::CONTENT_TYPE,
                fetched.header("content-type").unwrap_or(kind.content_type()),
            );
            insert_header(&mut headers, header::CACHE_CONTROL, THUMBNAIL_MAX_AGE);
            (StatusCode::OK, headers, fetched.body).into_response()
        }
        Err(e) => {
            warn!("Thumbnail for {} failed: {}", id, e);
            text_response(StatusCode::NOT_FOUND, "not found", "public, max-age=60")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{ResolverContext, ResolverOptions};
    use crate::platform::client::MockTransport;
    use crate::platform::resolver::StrategyKind;

    const VIDEO_ID: &str = "abc123XYZ_-";

    fn player_response() -> String {
        json!({
            "playabilityStatus": {"status": "OK"},
            "videoDetails": {"videoId": VIDEO_ID, "title": "Title", "author": "Author", "lengthSeconds": "30"},
            "streamingData": {
                "formats": [{"itag": 18, "url": "https://r1.example/videoplayback?itag=18", "mimeType": "video/mp4", "qualityLabel": "360p"}]
            }
        })
        .to_string()
    }

    fn state(transport: MockTransport, expose_urls: bool) -> (Arc<MockTransport>, Arc<ServerState>) {
        let transport = Arc::new(transport);
        let options = ResolverOptions::default().with_strategies(vec![StrategyKind::InternalApi]);
        let ctx = ResolverContext::new(transport.clone(), options);
        (transport, Arc::new(ServerState::new(ctx, expose_urls)))
    }

    fn api_transport() -> MockTransport {
        MockTransport::new().with_post(
            &ResolverOptions::default().endpoints.player_api_url,
            &player_response(),
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn cache_control(response: &Response) -> String {
        response.headers()[header::CACHE_CONTROL]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_info_strips_urls_and_caches() {
        let (transport, state) = state(api_transport(), false);

        let response = dispatch(State(state.clone()), Path(format!("{VIDEO_ID}.json"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(cache_control(&response).starts_with("public, max-age=9999"));
        let body = body_json(response).await;
        assert_eq!(body["title"], "Title");
        assert!(body["streams"]["18"].get("url").is_none());

        dispatch(State(state), Path(format!("{VIDEO_ID}.json"))).await;
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_info_exposes_urls_when_enabled() {
        let (_, state) = state(api_transport(), true);
        let response = dispatch(State(state), Path(format!("{VIDEO_ID}.json"))).await;
        let body = body_json(response).await;
        assert_eq!(
            body["streams"]["18"]["url"],
            "https://r1.example/videoplayback?itag=18"
        );
    }

    #[tokio::test]
    async fn test_info_failure_envelope() {
        let (_, state) = state(MockTransport::new(), false);
        let response = dispatch(State(state), Path(format!("{VIDEO_ID}.json"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(cache_control(&response), "public, max-age=3600");
        let body = body_json(response).await;
        assert_eq!(body["code"], -1);
        assert!(body["msg"].as_str().unwrap().starts_with("All strategies failed"));
    }

    #[tokio::test]
    async fn test_segment_proxy() {
        let media = FetchedBody::new(200, vec![1u8, 2, 3])
            .with_header("content-type", "video/mp4")
            .with_header("content-length", "3")
            .with_header("set-cookie", "x=y");
        let transport = api_transport()
            .with_get_response("https://r1.example/videoplayback?itag=18&range=0-2", media);
        let (transport, state) = state(transport, false);

        let path = format!("{VIDEO_ID}/18/0-2.ts");
        let response = dispatch(State(state.clone()), Path(path.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(cache_control(&response).contains("99"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), &[1u8, 2, 3]);

        let response = dispatch(State(state), Path(path)).await;
        assert_eq!(cache_control(&response), "public, max-age=864000");
        assert_eq!(transport.count(&ResolverOptions::default().endpoints.player_api_url), 1);
    }

    #[tokio::test]
    async fn test_segment_unknown_itag() {
        let (_, state) = state(api_transport(), false);
        let response = dispatch(State(state.clone()), Path(format!("{VIDEO_ID}/99/0-2.ts"))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["msg"], "itag 99 not found");
        assert!(state.ctx.caches().streams.is_empty());
    }

    #[tokio::test]
    async fn test_segment_rejects_oversized_ranges() {
        let (transport, rejecting) = state(api_transport(), false);
        for range in ["0-99999999999", "10-5"] {
            let path = format!("{VIDEO_ID}/18/{range}.ts");
            let response = dispatch(State(rejecting.clone()), Path(path)).await;
            assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        }
        assert!(transport.requests().is_empty());

        let last = MAX_SEGMENT_BYTES - 1;
        let accepting_transport = api_transport().with_get_response(
            &format!("https://r1.example/videoplayback?itag=18&range=0-{last}"),
            FetchedBody::new(200, vec![0u8]),
        );
        let (_, accepting) = state(accepting_transport, false);
        let response = dispatch(State(accepting), Path(format!("{VIDEO_ID}/18/0-{last}.ts"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_thumbnail_passthrough() {
        let transport = MockTransport::new().with_get(
            &format!("https://i.ytimg.com/vi/{VIDEO_ID}/mqdefault.jpg"),
            vec![0xffu8, 0xd8],
        );
        let (_, state) = state(transport, false);
        let response = dispatch(State(state), Path(format!("{VIDEO_ID}.jpg"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(cache_control(&response), "public, max-age=604800");
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (_, state) = state(MockTransport::new(), false);
        let response = dispatch(State(state), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

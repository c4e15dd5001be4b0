use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use music_stream::{build, StreamSettings};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn song() -> Vec<u8> {
    (0..3000u32).map(|i| (i % 251) as u8).collect()
}

fn setup() -> (TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    std::fs::create_dir(&uploads).unwrap();
    std::fs::write(uploads.join("song.mp3"), song()).unwrap();
    std::fs::write(uploads.join("short.mp3"), (0u8..100).collect::<Vec<_>>()).unwrap();
    std::fs::write(dir.path().join("outside.mp3"), b"secret").unwrap();

    let settings = StreamSettings::default()
        .with_upload_dir(uploads)
        .with_read_chunk_kb(1);
    let ax = build(&settings).unwrap();
    (dir, ax.router)
}

fn get(uri: &str, range: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(range) = range {
        builder = builder.header("range", range);
    }
    builder.body(Body::empty()).unwrap()
}

async fn bytes(res: axum::response::Response) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn health_ok() {
    let (_dir, router) = setup();

    let res = router.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(bytes(res).await, b"ok");
}

#[tokio::test]
async fn first_eleven_bytes() {
    let (_dir, router) = setup();

    let res = router
        .oneshot(get("/audio/stream/short.mp3", Some("bytes=0-10")))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 206);
    assert_eq!(res.headers()["content-range"], "bytes 0-10/100");
    assert_eq!(res.headers()["content-length"], "11");
    assert_eq!(bytes(res).await, (0u8..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn whole_file_without_range() {
    let (_dir, router) = setup();

    let res = router
        .oneshot(get("/audio/stream/short.mp3", None))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers()["content-length"], "100");
    assert_eq!(res.headers()["content-type"], "audio/mpeg");
    assert_eq!(res.headers()["accept-ranges"], "bytes");
    assert_eq!(bytes(res).await, (0u8..100).collect::<Vec<_>>());
}

#[tokio::test]
async fn range_past_the_end_is_416() {
    let (_dir, router) = setup();

    let res = router
        .oneshot(get("/audio/stream/short.mp3", Some("bytes=150-200")))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 416);
    assert_eq!(res.headers()["content-range"], "bytes */100");
    assert!(bytes(res).await.is_empty());
}

#[tokio::test]
async fn missing_file_is_404_json() {
    let (_dir, router) = setup();

    let res = router
        .oneshot(get("/audio/stream/missing.mp3", None))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 404);
    let body: Value = serde_json::from_slice(&bytes(res).await).unwrap();
    assert_eq!(body["error"], "Audio file not found");
}

#[tokio::test]
async fn traversal_out_of_upload_dir_is_404() {
    let (_dir, router) = setup();

    for uri in [
        "/audio/stream/..%2Foutside.mp3",
        "/audio/stream/%2e%2e%2foutside.mp3",
        "/audio/stream/%2Fetc%2Fpasswd",
    ] {
        let res = router.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(res.status().as_u16(), 404, "{uri}");
    }
}

#[tokio::test]
async fn multi_chunk_ranges_match_the_file() {
    let (_dir, router) = setup();
    let song = song();

    for (range, start, end) in [
        ("bytes=1000-2500", 1000, 2500),
        ("bytes=2999-", 2999, 2999),
        ("bytes=-1500", 1500, 2999),
        ("bytes=10-99999", 10, 2999),
    ] {
        let res = router
            .clone()
            .oneshot(get("/audio/stream/song.mp3", Some(range)))
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 206, "{range}");
        assert_eq!(
            res.headers()["content-range"].to_str().unwrap(),
            format!("bytes {start}-{end}/3000")
        );
        assert_eq!(bytes(res).await, song[start..=end].to_vec(), "{range}");
    }
}

#[tokio::test]
async fn adjacent_ranges_concatenate_to_whole_file() {
    let (_dir, router) = setup();
    let mut rebuilt = Vec::new();

    for range in ["bytes=0-1023", "bytes=1024-2047", "bytes=2048-"] {
        let res = router
            .clone()
            .oneshot(get("/audio/stream/song.mp3", Some(range)))
            .await
            .unwrap();
        rebuilt.extend(bytes(res).await);
    }

    assert_eq!(rebuilt, song());
}

#[tokio::test]
async fn cors_exposes_range_headers() {
    let (_dir, router) = setup();

    let res = router
        .oneshot(
            Request::builder()
                .uri("/audio/stream/short.mp3")
                .header("origin", "http://player.example")
                .header("range", "bytes=0-0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let exposed = res.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-range"));
    assert!(res.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn static_dir_serves_unmatched_paths() {
    let dir = tempfile::tempdir().unwrap();
    let web = tempfile::tempdir().unwrap();
    std::fs::write(web.path().join("index.html"), "<h1>player</h1>").unwrap();

    let settings = StreamSettings::default()
        .with_upload_dir(dir.path())
        .with_static_dir(web.path());
    let router = build(&settings).unwrap().router;

    let res = router.oneshot(get("/index.html", None)).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(bytes(res).await, b"<h1>player</h1>");
}

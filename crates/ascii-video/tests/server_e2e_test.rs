//! End-to-end tests against a server bound to an ephemeral port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use ascii_video::{AppState, Server};
use ascii_video_core::ansi::{preamble, teardown};
use ascii_video_core::ServerConfig;
use ascii_video_store::AnimationRegistry;

const CURL: &str = "curl/8.4.0";
const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0";

struct TestServer {
    addr: SocketAddr,
    root: PathBuf,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let root = std::env::temp_dir().join(format!("ascii-video-e2e-{}", uuid::Uuid::new_v4()));
        let dir = root.join("overdrive");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("frame_000000.txt"), "FRAME-A\n").unwrap();
        std::fs::write(dir.join("frame_000001.txt"), "FRAME-B\n").unwrap();
        std::fs::create_dir_all(root.join("parrot")).unwrap();
        std::fs::write(root.join("parrot").join("frame_000000.txt"), "PARROT\n").unwrap();

        let mut config = ServerConfig::default();
        config.assets.root = root.clone();
        config.server.redirect_url = "https://example.com/project".to_string();

        let registry = Arc::new(AnimationRegistry::new(&root, false));
        let state = AppState::new(registry, &config);
        let server = Server::bind("127.0.0.1:0", state).await.unwrap();
        let addr = server.local_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = stopped.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            root,
            stop: Some(stop),
            handle,
        }
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("server should stop")
            .unwrap();
        std::fs::remove_dir_all(&self.root).ok();
    }
}

async fn send(addr: SocketAddr, request_line: &str, user_agent: Option<&str>) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut head = format!("{request_line}\r\nHost: localhost\r\n");
    if let Some(ua) = user_agent {
        head.push_str(&format!("User-Agent: {ua}\r\n"));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();
    stream
}

/// Read until `needle` shows up in the output or the deadline passes.
async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    out.extend_from_slice(&buf[..n]);
                    if String::from_utf8_lossy(&out).contains(needle) {
                        break;
                    }
                }
            }
        }
    })
    .await;
    String::from_utf8_lossy(&out).into_owned()
}

async fn read_to_close(stream: &mut TcpStream) -> String {
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .expect("server should close the connection")
        .unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

#[tokio::test]
async fn test_terminal_client_receives_stream() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "GET /?interval=0.01 HTTP/1.1", Some(CURL)).await;
    let text = read_until(&mut stream, "FRAME-B").await;

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Cache-Control: no-cache, no-store, must-revalidate\r\n"));
    assert!(text.contains("Connection: close\r\n"));
    let body = &text[text.find("\r\n\r\n").unwrap() + 4..];
    assert!(body.starts_with(&preamble()));
    assert!(body.contains("FRAME-A"));
    assert!(body.contains("FRAME-B"));
    assert!(body.contains("Animation 'overdrive' #1/2"));
    assert!(body.contains("Interval: 0.01s | Stride: 1 | Total frames: 2"));

    drop(stream);
    server.shutdown().await;
}

#[tokio::test]
async fn test_named_animation_and_stride() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "GET /overdrive?interval=0.01&stride=2 HTTP/1.1", Some(CURL)).await;
    let text = read_until(&mut stream, "Stride: 2").await;
    assert!(text.contains("FRAME-A"));
    assert!(text.contains("#1/1"));
    assert!(!text.contains("FRAME-B"));

    drop(stream);
    server.shutdown().await;
}

#[tokio::test]
async fn test_browser_is_redirected() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "GET / HTTP/1.1", Some(BROWSER)).await;
    let text = read_to_close(&mut stream).await;
    assert!(text.starts_with("HTTP/1.1 302 Found\r\n"));
    assert!(text.contains("Location: https://example.com/project\r\n"));

    let mut stream = send(server.addr, "GET /parrot HTTP/1.1", None).await;
    let text = read_to_close(&mut stream).await;
    assert!(text.starts_with("HTTP/1.1 302"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "GET /health HTTP/1.1", Some(BROWSER)).await;
    let text = read_to_close(&mut stream).await;
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    let body = &text[text.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["status"], "healthy");

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_animation_lists_known_names() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "GET /nope?interval=0.01 HTTP/1.1", Some(CURL)).await;
    let text = read_until(&mut stream, "Total frames").await;
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("nope"));
    assert!(text.contains("Available folders: overdrive, parrot"));

    drop(stream);
    server.shutdown().await;
}

#[tokio::test]
async fn test_method_and_path_errors() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "POST / HTTP/1.1", Some(CURL)).await;
    let text = read_to_close(&mut stream).await;
    assert!(text.starts_with("HTTP/1.1 405"));
    assert!(text.contains("Allow: GET\r\n"));

    let mut stream = send(server.addr, "GET /a/b HTTP/1.1", Some(CURL)).await;
    let text = read_to_close(&mut stream).await;
    assert!(text.starts_with("HTTP/1.1 404"));

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"garbage\r\n\r\n").await.unwrap();
    let text = read_to_close(&mut stream).await;
    assert!(text.starts_with("HTTP/1.1 400"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_tears_down_open_streams() {
    let server = TestServer::start().await;

    let mut stream = send(server.addr, "GET / HTTP/1.1", Some(CURL)).await;
    read_until(&mut stream, "Total frames").await;

    server.shutdown().await;

    let rest = read_to_close(&mut stream).await;
    assert!(rest.ends_with(&teardown()));
}

#[tokio::test]
async fn test_concurrent_streams_are_independent() {
    let server = TestServer::start().await;

    let mut slow = send(server.addr, "GET /?interval=10 HTTP/1.1", Some(CURL)).await;
    let mut fast = send(server.addr, "GET /parrot?interval=0.01 HTTP/1.1", Some(CURL)).await;

    let text = read_until(&mut fast, "Animation 'parrot'").await;
    assert!(text.contains("PARROT"));
    let text = read_until(&mut slow, "Total frames").await;
    assert!(text.contains("FRAME-A"));

    drop(slow);
    drop(fast);
    server.shutdown().await;
}

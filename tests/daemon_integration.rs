//! End-to-end tests: a real daemon on a temporary socket, a recording
//! virtual strip, and both raw socket clients and `LedClient`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use motorpass_led::config::DaemonConfig;
use motorpass_led::daemon;
use motorpass_led::hal::{StripProbe, VirtualStrip};
use motorpass_led_client::{LedClient, LedClientConfig};
use motorpass_led_protocol::{Response, Rgb, Status};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const PIXELS: usize = 12;

struct TestDaemon {
    path: PathBuf,
    probe: StripProbe,
    shutdown: CancellationToken,
    task: JoinHandle<anyhow::Result<()>>,
}

impl TestDaemon {
    async fn start(path: &Path) -> Self {
        let (driver, probe) = VirtualStrip::recording(PIXELS);
        let config = DaemonConfig {
            socket_path: path.to_path_buf(),
            startup_flash: false,
            ..DaemonConfig::default()
        };
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(daemon::run(config, Box::new(driver), shutdown.clone()));
        wait_for_socket(path).await;
        Self {
            path: path.to_path_buf(),
            probe,
            shutdown,
            task,
        }
    }

    fn client(&self) -> Arc<LedClient> {
        Arc::new(LedClient::new(LedClientConfig::with_socket(&self.path)))
    }

    async fn stop(self) -> StripProbe {
        self.shutdown.cancel();
        self.task.await.unwrap().unwrap();
        self.probe
    }
}

async fn wait_for_socket(path: &Path) {
    for _ in 0..200 {
        if UnixStream::connect(path).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("daemon did not come up at {}", path.display());
}

/// Send raw bytes as one request and read the whole reply.
async fn raw_request(path: &Path, payload: &[u8]) -> Vec<u8> {
    let mut stream = UnixStream::connect(path).await.unwrap();
    stream.write_all(payload).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    reply
}

async fn request(path: &Path, payload: &str) -> Response {
    let reply = raw_request(path, payload.as_bytes()).await;
    serde_json::from_slice(&reply).unwrap()
}

/// Run a blocking client call off the runtime threads.
async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn all(frame: &[Rgb], color: Rgb) -> bool {
    frame.iter().all(|p| *p == color)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bad_requests_get_errors_and_daemon_survives() {
    let dir = TempDir::new().unwrap();
    let daemon = TestDaemon::start(&dir.path().join("led.sock")).await;
    let shown = daemon.probe.show_count();

    let reply = request(&daemon.path, "this is not json").await;
    assert_eq!(reply.status, Status::Error);

    let reply = request(&daemon.path, r#"{"action":"dance"}"#).await;
    assert_eq!(reply.status, Status::Error);

    let reply = request(&daemon.path, r#"{"action":"set_state","state":"disco"}"#).await;
    assert_eq!(reply.status, Status::Error);

    let reply = request(&daemon.path, r#"{"action":"flash","color":[300,0,0]}"#).await;
    assert_eq!(reply.status, Status::Error);

    let reply = request(&daemon.path, r#"{"action":"flash","times":-1}"#).await;
    assert_eq!(reply.status, Status::Error);

    // cut off mid-message
    let reply = request(&daemon.path, r#"{"action":"set_st"#).await;
    assert_eq!(reply.status, Status::Error);

    assert_eq!(daemon.probe.show_count(), shown);
    let reply = request(&daemon.path, r#"{"action":"ping"}"#).await;
    assert!(reply.is_ok());

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_connection_gets_no_reply() {
    let dir = TempDir::new().unwrap();
    let daemon = TestDaemon::start(&dir.path().join("led.sock")).await;

    let reply = raw_request(&daemon.path, b"").await;
    assert!(reply.is_empty());

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_oversized_request_is_rejected() {
    let dir = TempDir::new().unwrap();
    let daemon = TestDaemon::start(&dir.path().join("led.sock")).await;

    // an unterminated string larger than the limit
    let mut payload = br#"{"action":"ping","pad":""#.to_vec();
    payload.resize(payload.len() + 70 * 1024, b'x');
    let reply = raw_request(&daemon.path, &payload).await;
    let reply: Response = serde_json::from_slice(&reply).unwrap();
    assert_eq!(reply.status, Status::Error);

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_progress_over_100_lights_whole_ring() {
    let dir = TempDir::new().unwrap();
    let daemon = TestDaemon::start(&dir.path().join("led.sock")).await;
    let client = daemon.client();

    assert!(blocking(move || client.show_progress(150.0, Rgb::GREEN)).await);
    let frame = daemon.probe.last_frame().unwrap();
    assert_eq!(frame.len(), PIXELS);
    assert!(all(&frame, Rgb::GREEN));

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_processing_then_success_ends_green() {
    let dir = TempDir::new().unwrap();
    let daemon = TestDaemon::start(&dir.path().join("led.sock")).await;
    let client = daemon.client();

    let ok = blocking(move || client.processing() && client.success(None)).await;
    assert!(ok);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let frames = daemon.probe.frames();
    let first_green = frames.iter().position(|f| all(f, Rgb::GREEN)).unwrap();
    assert_eq!(first_green, frames.len() - 1);

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_client_recovers_when_daemon_appears() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("led.sock");
    let client = Arc::new(LedClient::new(LedClientConfig::with_socket(&path)));

    let c = Arc::clone(&client);
    let (first, second, available) =
        blocking(move || (c.idle(), c.idle(), c.is_available())).await;
    assert!(!first && !second && !available);

    let daemon = TestDaemon::start(&path).await;
    let c = Arc::clone(&client);
    let (available, ok) = blocking(move || (c.is_available(), c.idle())).await;
    assert!(available);
    assert!(ok);

    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_blanks_ring_and_removes_socket() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("led.sock");
    let daemon = TestDaemon::start(&path).await;
    let client = daemon.client();

    assert!(blocking(move || client.processing()).await);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let probe = daemon.stop().await;
    assert!(!path.exists());
    assert!(all(&probe.last_frame().unwrap(), Rgb::BLACK));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_daemon_refuses_live_socket() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("led.sock");
    let daemon = TestDaemon::start(&path).await;

    let config = DaemonConfig {
        socket_path: path.clone(),
        startup_flash: false,
        ..DaemonConfig::default()
    };
    let err = daemon::run(config, Box::new(VirtualStrip::new(PIXELS)), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already"), "{err}");

    // the first daemon is untouched
    let reply = request(&path, r#"{"action":"ping"}"#).await;
    assert!(reply.is_ok());
    daemon.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stale_socket_file_is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("led.sock");
    // a socket file nobody listens on
    drop(std::os::unix::net::UnixListener::bind(&path).unwrap());
    assert!(path.exists());

    let daemon = TestDaemon::start(&path).await;
    let reply = request(&path, r#"{"action":"ping"}"#).await;
    assert!(reply.is_ok());
    daemon.stop().await;
}

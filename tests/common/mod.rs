//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use barzer_gateway::{GatewayConfig, GatewayServer, IdentityTable, Shutdown};
use barzer_gateway::relay::BackendRelay;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const TERMINATOR: &[u8] = b"\r\n.\r\n";

/// A backend that records each frame it receives and answers with a fixed reply.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub connections: Arc<AtomicUsize>,
    frames: mpsc::UnboundedReceiver<String>,
}

impl MockBackend {
    /// Next frame received, waiting up to two seconds.
    pub async fn next_frame(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.frames.recv())
            .await
            .expect("backend received no frame")
            .expect("backend task ended")
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a backend that reads one frame per connection, replies and closes.
pub async fn start_backend(reply: Vec<u8>) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let (tx, frames) = mpsc::unbounded_channel();
    let reply = Arc::new(reply);

    let counter = connections.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let tx = tx.clone();
                    let reply = reply.clone();
                    tokio::spawn(async move {
                        let mut received = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !received.ends_with(TERMINATOR) {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => received.extend_from_slice(&buf[..n]),
                            }
                        }
                        let _ = tx.send(String::from_utf8_lossy(&received).into_owned());
                        let _ = socket.write_all(&reply).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend {
        addr,
        connections,
        frames,
    }
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn identities() -> IdentityTable {
    [
        ("k1".to_string(), "alice".to_string()),
        ("k2".to_string(), "bob".to_string()),
    ]
    .into_iter()
    .collect()
}

/// A running gateway bound to an ephemeral port.
pub struct Gateway {
    pub addr: SocketAddr,
    pub relay: BackendRelay,
    pub shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(backend: SocketAddr, verbose: bool) -> Gateway {
    let mut config = GatewayConfig::default();
    config.backend.address = backend.to_string();
    config.observability.verbose = verbose;

    let server = GatewayServer::new(&config, Arc::new(identities()));
    let relay = server.relay().clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    Gateway {
        addr,
        relay,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Sorted `name="value"` attributes of a frame's opening tag.
pub fn frame_attributes(frame: &str) -> Vec<String> {
    let open_end = frame.find('>').expect("frame has no opening tag");
    let mut attrs: Vec<String> = frame[..open_end]
        .trim_start_matches("<query")
        .split(' ')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    attrs.sort();
    attrs
}

/// Text between the opening tag and `</query>`.
pub fn frame_query_text(frame: &str) -> &str {
    let start = frame.find('>').expect("frame has no opening tag") + 1;
    let end = frame.rfind("</query>").expect("frame has no closing tag");
    &frame[start..end]
}

/// The frame with its attributes sorted, so frames built from differently
/// ordered maps compare equal.
pub fn normalized_frame(frame: &str) -> String {
    let open_end = frame.find('>').expect("frame has no opening tag");
    format!(
        "<query {}{}",
        frame_attributes(frame).join(" "),
        &frame[open_end..]
    )
}

/// Log sink shared between a subscriber and the test that inspects it.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Subscriber writing plain text into this capture at DEBUG and above.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

//! Shared test fixtures: a mock serial-to-ethernet relay speaking the
//! met4 command protocol, and helpers for injecting wind datagrams.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::time::sleep;

use metserver_rs::config::MetServerConfig;

/// Mock relay. Answers the three met4 queries; the temperature value
/// increases by one per served connection so tests can observe snapshot
/// refreshes (first connection reports 21.5).
pub struct MockRelay {
    pub addr: SocketAddr,
    pub connections: Arc<AtomicUsize>,
}

impl MockRelay {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let seen = connections.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let n = seen.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 64];
                    loop {
                        let Ok(len) = stream.read(&mut buf).await else {
                            break;
                        };
                        if len == 0 {
                            break;
                        }
                        let command = String::from_utf8_lossy(&buf[..len]).into_owned();
                        let reply = if command.contains("TT") {
                            format!("*0001 {:.1}\r\n", 21.5 + n as f64)
                        } else if command.contains("P3") {
                            "*0001 1002.3\r\n".to_string()
                        } else if command.contains("RH") {
                            "*0001 48.2\r\n".to_string()
                        } else {
                            "*0001 0.0\r\n".to_string()
                        };
                        if stream.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        Self { addr, connections }
    }

    pub fn connections_seen(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Mock relay that answers every query with garbage shorter than the
/// met4 response header.
pub struct BrokenRelay {
    pub addr: SocketAddr,
}

impl BrokenRelay {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 64];
                    while let Ok(len) = stream.read(&mut buf).await {
                        if len == 0 {
                            break;
                        }
                        if stream.write_all(b"?\r\n").await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        Self { addr }
    }
}

/// Feed anemometer-style datagrams straight at the reader's port every
/// 100 ms, `repeats` times.
pub fn spawn_wind_feed(port: u16, direction: f64, speed: f64, repeats: u32) {
    tokio::spawn(async move {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let datagram = format!("IIMWV,A,{},R,{},N", direction, speed);
        for _ in 0..repeats {
            let _ = socket
                .send_to(datagram.as_bytes(), ("127.0.0.1", port))
                .await;
            sleep(Duration::from_millis(100)).await;
        }
    });
}

/// Config with both met transports disabled and fast wind timeouts;
/// tests enable what they need.
pub fn test_config(wind_port: u16) -> MetServerConfig {
    let mut config = MetServerConfig::default();
    config.serial.enabled = false;
    config.serial.device = "/dev/metserver-test-does-not-exist".into();
    config.relay.enabled = false;
    config.wind.port = wind_port;
    config.wind.attempts = 1;
    config.wind.retry_delay_secs = 1;
    config.wind.read_timeout_secs = 1;
    config
}

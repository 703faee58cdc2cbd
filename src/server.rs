//! TCP service: one snapshot line per connection.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;

use crate::snapshot::SnapshotStore;

/// Pause per accepted connection when throttling is enabled.
const THROTTLE_PAUSE: Duration = Duration::from_millis(10);

/// Queued connections beyond the worker cap wait here.
const ACCEPT_BACKLOG: u32 = 10;

/// Serves the current snapshot to TCP clients.
///
/// Per connection: accept, copy the snapshot, write it as one
/// comma-joined ASCII line, shut the socket down, close. Nothing is read
/// from the client. Workers are capped by a permit pool; connections
/// beyond the cap wait in the OS accept backlog.
pub struct MetServer {
    listener: TcpListener,
    store: SnapshotStore,
    permits: Arc<Semaphore>,
    throttle: bool,
}

impl MetServer {
    /// Bind the listening socket. Bind failures are fatal and propagate
    /// to startup.
    pub async fn bind(
        host: &str,
        port: u16,
        store: SnapshotStore,
        max_clients: usize,
        throttle: bool,
    ) -> io::Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "invalid listen address"))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(ACCEPT_BACKLOG)?;

        Ok(Self {
            listener,
            store,
            permits: Arc::new(Semaphore::new(max_clients)),
            throttle,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Returns when `shutdown` fires; in-flight workers
    /// drain on their own.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let permit = tokio::select! {
                permit = self.permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = shutdown.changed() => break,
            };

            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("accept failed: {}", e);
                        continue;
                    }
                },
                _ = shutdown.changed() => break,
            };

            debug!("connected with {}", peer);
            tokio::spawn(handle_client(stream, peer, self.store.clone(), permit));

            if self.throttle {
                sleep(THROTTLE_PAUSE).await;
            }
        }
        info!("server loop stopped");
    }
}

/// Serve one client. Serving errors stay local to the connection; the
/// shutdown step swallows peer-already-gone errors.
async fn handle_client(
    mut stream: TcpStream,
    peer: SocketAddr,
    store: SnapshotStore,
    _permit: OwnedSemaphorePermit,
) {
    let reading = store.get().await;
    let line = reading.to_string();

    if let Err(e) = stream.write_all(line.as_bytes()).await {
        warn!("write to {} failed: {}", peer, e);
    }
    if let Err(e) = stream.shutdown().await {
        debug!("shutdown for {} failed: {}", peer, e);
    }
    debug!("connection with {} closed", peer);
}

//! TCP accept loop and per-connection handling.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use ascii_video_core::{Error, Result};
use ascii_video_stream::StreamSession;

use crate::http::{read_request, stream_head, Response};
use crate::router::{route, Action, AppState};

/// How long open sessions get to write their teardown on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP server streaming animations to terminal clients.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_tx: watch::Sender<bool>,
}

impl Server {
    /// Bind the listening socket.
    pub async fn bind(addr: impl ToSocketAddrs, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(Error::Io)?;
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            listener,
            state: Arc::new(state),
            shutdown_tx,
        })
    }

    /// Get the actual bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Error::Io)
    }

    /// Accept connections until `signal` resolves, then cancel every open
    /// session and wait briefly for their teardown.
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);
        let mut connections = JoinSet::new();
        info!(addr = %self.local_addr()?, "Server listening");

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            debug!(peer = %peer_addr, "Accepted connection");
                            connections.spawn(handle_connection(
                                stream,
                                peer_addr,
                                Arc::clone(&self.state),
                                self.shutdown_tx.subscribe(),
                            ));
                        }
                        Err(e) => accept_failed(&e).await,
                    }
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = &mut signal => {
                    info!(open = connections.len(), "Server shutting down");
                    break;
                }
            }
        }

        drop(self.listener);
        let _ = self.shutdown_tx.send(true);

        let drain = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            warn!(
                open = connections.len(),
                "Connections still open after grace period, aborting"
            );
            connections.abort_all();
        }

        Ok(())
    }
}

async fn accept_failed(e: &std::io::Error) {
    error!(error = %e, "Accept failed");
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

/// Serve one connection, logging rather than propagating failures.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) {
    if let Err(e) = serve_connection(stream, peer_addr, state, shutdown).await {
        debug!(peer = %peer_addr, error = %e, "Connection ended early");
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match read_request(&mut reader).await {
        Ok(request) => request,
        Err(Error::BadRequest(reason)) => {
            debug!(peer = %peer_addr, %reason, "Bad request");
            writer
                .write_all(&Response::text(400, "Bad Request\n").to_bytes())
                .await?;
            writer.shutdown().await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match route(&request, &state).await {
        Action::Respond(response) => {
            debug!(peer = %peer_addr, status = response.status, "Responding");
            writer.write_all(&response.to_bytes()).await?;
            writer.shutdown().await?;
        }
        Action::Stream { animation, params } => {
            writer.write_all(stream_head().as_bytes()).await?;
            let session = StreamSession::new(animation, params);
            let report = session
                .run(writer, cancellation(reader, shutdown))
                .await;
            debug!(
                peer = %peer_addr,
                session = %report.id,
                frames = report.frames_sent,
                "Connection closed"
            );
        }
    }

    Ok(())
}

/// Resolves when the client closes its side of the connection or the
/// server begins shutting down.
async fn cancellation(mut reader: OwnedReadHalf, mut shutdown: watch::Receiver<bool>) {
    let mut buf = [0u8; 512];
    loop {
        if *shutdown.borrow() {
            return;
        }
        tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

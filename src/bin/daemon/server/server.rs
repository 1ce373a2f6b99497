use super::command_registry::RegistryHandle;
use super::dispatcher::Dispatcher;
use super::session::Session;
use crate::config::DaemonConfig;
use crate::utils::error::{DaemonError, Result};
use async_std::channel::Receiver;
use async_std::net::{TcpListener, TcpStream};
use async_std::task::{self, JoinHandle};
use futures::FutureExt;
use futures::StreamExt;
use futures::io::BufReader;
use futures::stream::FuturesUnordered;
use remotecmd::FrameCodec;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{Instrument, error, info, info_span, warn};

/// Pause after a failed accept before trying again
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Main daemon server structure that accepts TCP connections
///
/// Each accepted connection gets its own session task; sessions share
/// nothing but the command registry.
pub struct DaemonServer {
    /// Listening socket
    listener: TcpListener,
    codec: FrameCodec,
    dispatcher: Dispatcher,
    idle_timeout: Option<Duration>,
    shutdown_grace: Duration,
}

impl DaemonServer {
    /// Bind the listening socket described by `config`
    ///
    /// # Returns
    /// * `Result<DaemonServer>` - A new daemon server, or `BindError` if the
    ///   endpoint is unavailable
    pub async fn bind(config: &DaemonConfig, registry: RegistryHandle) -> Result<Self> {
        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| DaemonError::BindError {
                addr: addr.clone(),
                source,
            })?;

        Ok(DaemonServer {
            listener,
            codec: FrameCodec::new(config.max_payload_len),
            dispatcher: Dispatcher::new(registry),
            idle_timeout: config.idle_timeout(),
            shutdown_grace: config.shutdown_grace(),
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop until a shutdown signal arrives
    ///
    /// # Arguments
    /// * `shutdown_rx` - Receiver for shutdown signal
    ///
    /// After the signal no new connections are accepted. Live sessions get
    /// the configured grace period to finish before this returns.
    pub async fn run(&self, shutdown_rx: Receiver<()>) -> Result<()> {
        let mut sessions = FuturesUnordered::new();

        loop {
            futures::select! {
                accepted = self.listener.accept().fuse() => {
                    match accepted {
                        Ok((stream, peer)) => sessions.push(self.spawn_session(stream, peer)),
                        Err(e) => {
                            error!("Error accepting connection: {:?}", e);
                            task::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }
                () = sessions.select_next_some() => {}
                _ = shutdown_rx.recv().fuse() => {
                    info!("Shutdown signal received, stopping server loop");
                    break;
                }
            }
        }

        self.drain(sessions).await;
        Ok(())
    }

    /// Wait for running sessions, up to the grace period
    async fn drain(&self, mut sessions: FuturesUnordered<JoinHandle<()>>) {
        if sessions.is_empty() {
            return;
        }

        info!("Waiting for {} live sessions", sessions.len());
        let finished = async_std::future::timeout(self.shutdown_grace, async {
            while sessions.next().await.is_some() {}
        })
        .await;

        if finished.is_err() {
            warn!(
                "{} sessions still running after {:?}, abandoning them",
                sessions.len(),
                self.shutdown_grace
            );
        }
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) -> JoinHandle<()> {
        info!("Accepted connection from {}", peer);

        let reader = BufReader::new(stream.clone());
        let session = Session::new(reader, stream, self.codec, self.dispatcher.clone())
            .with_idle_timeout(self.idle_timeout);

        task::spawn(
            async move {
                let end = session.run().await;
                info!("Session closed: {:?}", end);
            }
            .instrument(info_span!("session", %peer)),
        )
    }
}

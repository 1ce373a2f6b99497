//! Session Module
//!
//! Per-connection control loop. A session reads one frame, dispatches it,
//! sends the response and only then reads the next frame, so at most one
//! command is in flight per peer.
//!
//! ```text
//! AwaitingFrame --frame--> Dispatching --outcome--> SendingResponse --sent--> AwaitingFrame
//! AwaitingFrame --closed/framing error--> Closed
//! Dispatching --exit--> Closed
//! ```

use super::dispatcher::{Dispatch, Dispatcher};
use async_std::task;
use futures::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use remotecmd::{Frame, FrameCodec, FrameError, ResponseEnvelope};
use std::time::Duration;
use tracing::{debug, info, warn};

/// State of a session's control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFrame,
    Dispatching,
    SendingResponse,
    Closed,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer sent the exit command
    Exit,
    /// The peer went away or stayed idle past the deadline
    Disconnected,
    /// The peer broke the frame grammar
    ProtocolError,
}

/// One connection's frame exchange
pub struct Session<R, W> {
    reader: R,
    writer: W,
    codec: FrameCodec,
    dispatcher: Dispatcher,
    idle_timeout: Option<Duration>,
    state: SessionState,
    end: Option<SessionEnd>,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, codec: FrameCodec, dispatcher: Dispatcher) -> Self {
        Self {
            reader,
            writer,
            codec,
            dispatcher,
            idle_timeout: None,
            state: SessionState::AwaitingFrame,
            end: None,
        }
    }

    /// Close the session if a frame is not fully read within `timeout`
    ///
    /// The deadline covers the whole frame, payload included, and restarts
    /// with each new frame.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion and close the connection
    pub async fn run(mut self) -> SessionEnd {
        let end = loop {
            if let Some(end) = self.step().await {
                break end;
            }
        };

        if let Err(e) = self.writer.close().await {
            debug!("Error while closing connection: {}", e);
        }

        end
    }

    /// Exchange one frame
    ///
    /// Returns `Some` once the session has reached `Closed`; further calls
    /// keep returning the same end without touching the connection.
    pub async fn step(&mut self) -> Option<SessionEnd> {
        if let Some(end) = self.end {
            return Some(end);
        }

        let request = match self.read_frame().await {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => {
                info!("Peer disconnected");
                return self.close(SessionEnd::Disconnected);
            }
            Err(e) => {
                warn!("Closing session after framing error: {}", e);
                return self.close(SessionEnd::ProtocolError);
            }
        };

        self.transition(SessionState::Dispatching);
        let kind = request.kind();
        let outcome = match dispatch_blocking(self.dispatcher.clone(), request).await {
            Dispatch::Exit => return self.close(SessionEnd::Exit),
            Dispatch::Reply(outcome) => outcome,
        };

        self.transition(SessionState::SendingResponse);
        let sent = match ResponseEnvelope::encode(outcome, kind) {
            Ok(response) => self.codec.write(&mut self.writer, &response).await,
            Err(e) => Err(e),
        };
        match sent {
            Ok(()) => {
                self.transition(SessionState::AwaitingFrame);
                None
            }
            Err(FrameError::ConnectionClosed) => {
                info!("Peer disconnected before the response was sent");
                self.close(SessionEnd::Disconnected)
            }
            Err(e) => {
                warn!("Failed to send response: {}", e);
                self.close(SessionEnd::Disconnected)
            }
        }
    }

    async fn read_frame(&mut self) -> Result<Frame, FrameError> {
        let decode = self.codec.decode(&mut self.reader);
        match self.idle_timeout {
            Some(limit) => async_std::future::timeout(limit, decode)
                .await
                .unwrap_or_else(|_| {
                    info!("No frame within {:?}", limit);
                    Err(FrameError::ConnectionClosed)
                }),
            None => decode.await,
        }
    }

    fn close(&mut self, end: SessionEnd) -> Option<SessionEnd> {
        self.transition(SessionState::Closed);
        self.end = Some(end);
        self.end
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Run the handler on the blocking pool so a slow action stalls only its own session
async fn dispatch_blocking(dispatcher: Dispatcher, request: Frame) -> Dispatch {
    let kind = request.kind();
    let payload = request.into_payload();
    task::spawn_blocking(move || dispatcher.dispatch(kind, &payload)).await
}

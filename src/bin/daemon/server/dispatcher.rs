//! Dispatcher Module
//!
//! Resolves a decoded frame to its command, runs the handler and normalizes
//! the result into a `DispatchOutcome`. Every per-command fault ends up as the
//! uniform failure outcome; the detail stays in the daemon log.

use super::command_registry::{
    CommandError, CommandRegistry, CommandResult, HandlerOutput, RegistryHandle,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use remotecmd::{Arity, DispatchOutcome, EXIT_COMMAND_ID, FAILURE_MARKER};
use tracing::{error, info, warn};

/// What the session should do after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The peer asked to end the session; nothing is sent back
    Exit,
    /// Send this outcome back to the peer
    Reply(DispatchOutcome),
}

/// Command dispatcher shared by all sessions
#[derive(Clone)]
pub struct Dispatcher {
    registry: RegistryHandle,
}

impl Dispatcher {
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    /// Dispatch one command
    ///
    /// # Arguments
    /// * `kind` - The frame type, used as command identifier
    /// * `payload` - The raw frame payload
    ///
    /// # Returns
    /// * `Dispatch` - `Exit` for the reserved exit identifier, otherwise the outcome to send
    pub fn dispatch(&self, kind: u8, payload: &[u8]) -> Dispatch {
        if kind == EXIT_COMMAND_ID {
            info!("Peer requested exit");
            return Dispatch::Exit;
        }

        let registry = self.registry.snapshot();
        match invoke(&registry, kind, payload) {
            Ok(output) => Dispatch::Reply(normalize(kind, output)),
            Err(err) => {
                match &err {
                    CommandError::UnknownCommand(_) | CommandError::InvalidArguments(_) => {
                        warn!("Rejected command {}: {}", kind, err)
                    }
                    CommandError::ExecutionError(_) => {
                        error!("Failed to create a response for command {}: {}", kind, err)
                    }
                }
                Dispatch::Reply(DispatchOutcome::Failure)
            }
        }
    }
}

fn invoke(registry: &CommandRegistry, kind: u8, payload: &[u8]) -> CommandResult {
    let spec = registry.lookup(kind)?;
    // Commands without arguments never look at the payload
    let args = match spec.arity() {
        Arity::NoArgs => "",
        _ => std::str::from_utf8(payload).map_err(|e| {
            CommandError::InvalidArguments(format!("payload is not valid UTF-8: {}", e))
        })?,
    };

    info!("Executing command {} ({})", spec.name(), kind);
    spec.invoke(args)
}

/// Turn handler output into wire payload
///
/// Binary data is base64 encoded because peers read payloads as text. A text
/// result equal to the failure marker is reported as a failure, since the
/// peer cannot tell the two apart.
fn normalize(kind: u8, output: HandlerOutput) -> DispatchOutcome {
    match output {
        HandlerOutput::Unit => DispatchOutcome::success_marker(),
        HandlerOutput::Text(text) if text == FAILURE_MARKER => {
            warn!("Command {} produced the reserved failure marker", kind);
            DispatchOutcome::Failure
        }
        HandlerOutput::Text(text) => DispatchOutcome::Success(text.into_bytes()),
        HandlerOutput::Bytes(bytes) => {
            DispatchOutcome::Success(STANDARD.encode(bytes).into_bytes())
        }
    }
}

//! remotecmd
//!
//! Shared pieces of the remote command protocol used by both the `remotecmdd`
//! daemon and the `remotecmd` client: the frame codec, the canonical command
//! table and the response envelope.

pub mod protocol;

pub use protocol::command::{Arity, ArityError, CommandKind, EXIT_COMMAND_ID};
pub use protocol::envelope::{DispatchOutcome, FAILURE_MARKER, ResponseEnvelope, SUCCESS_MARKER};
pub use protocol::frame::{Frame, FrameCodec, FrameError};

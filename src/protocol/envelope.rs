//! Response Envelope Module
//!
//! Wraps the outcome of a dispatched command back into a frame. Responses echo
//! the request's type digit; failures carry the reserved marker `-1` and no
//! further detail.

use super::frame::{Frame, FrameError};

/// Payload sent for a command that completed without producing data
pub const SUCCESS_MARKER: &str = "0";
/// Payload sent for any command that failed
pub const FAILURE_MARKER: &str = "-1";

/// Result of dispatching one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success(Vec<u8>),
    Failure,
}

impl DispatchOutcome {
    /// Success carrying the canonical `"0"` marker
    pub fn success_marker() -> Self {
        DispatchOutcome::Success(SUCCESS_MARKER.as_bytes().to_vec())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failure)
    }
}

/// Converts between dispatch outcomes and response frames
pub struct ResponseEnvelope;

impl ResponseEnvelope {
    /// Build the response frame for `outcome`, echoing `original_type`
    pub fn encode(outcome: DispatchOutcome, original_type: u8) -> Result<Frame, FrameError> {
        match outcome {
            DispatchOutcome::Success(payload) => Frame::new(original_type, payload),
            DispatchOutcome::Failure => Frame::new(original_type, FAILURE_MARKER),
        }
    }

    /// Interpret a response frame received by a client
    ///
    /// A payload equal to the failure marker is always read as a failure.
    pub fn decode(frame: Frame) -> (u8, DispatchOutcome) {
        let kind = frame.kind();
        if frame.payload() == FAILURE_MARKER.as_bytes() {
            (kind, DispatchOutcome::Failure)
        } else {
            (kind, DispatchOutcome::Success(frame.into_payload()))
        }
    }
}

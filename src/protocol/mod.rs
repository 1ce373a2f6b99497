//! Protocol Module
//!
//! Wire grammar, command table and response wrapping shared by both sides of a
//! connection.
//!
//! The protocol is organized into three components:
//! - frame: length-prefixed typed frames and their async codec
//! - command: the fixed command table and argument arity rules
//! - envelope: wrapping of dispatch outcomes into response frames

/// Frame module - wire grammar encoding and decoding
pub mod frame;

/// Command module - canonical command identifiers and arity handling
pub mod command;

/// Envelope module - dispatch outcomes and their response frames
pub mod envelope;

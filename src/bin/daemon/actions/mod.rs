//! Actions Module
//!
//! The capabilities invoked by the command handlers. Every action is a plain
//! synchronous call that either returns its data or fails with a
//! `DaemonError`; the dispatcher decides what reaches the peer.

pub mod filesystem;
pub mod process;
pub mod screen;

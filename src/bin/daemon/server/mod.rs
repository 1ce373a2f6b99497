//! Server Module
//!
//! This module contains the core server components for the remotecmd daemon.
//!
//! The server module is organized into five components:
//! - command_registry: the fixed command table and its atomically swappable handle
//! - commands: binds every command of the table to its action
//! - dispatcher: resolves and runs one command, producing a dispatch outcome
//! - session: the per-connection frame exchange loop
//! - server: the TCP accept loop spawning one session per connection

/// Command registry module - command table, handlers and registry handle
pub mod command_registry;

/// Commands module - initializes and registers all available commands with the registry
pub mod commands;

/// Dispatcher module - command lookup, invocation and result normalization
pub mod dispatcher;

/// Session module - per-connection state machine
pub mod session;

/// Server module - TCP listener and session spawning
pub mod server;

//! Command Registry Module
//!
//! This module provides the fixed command table of the daemon. Commands are
//! registered once at startup in identifier order, the table is checked for
//! completeness, and it is read-only from then on. Sessions reach it through a
//! `RegistryHandle`, which allows the whole table to be replaced atomically.

use crate::utils::error::{DaemonError, Result};
use remotecmd::{Arity, ArityError, CommandKind};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Error type returned by command actions
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for command execution
pub type CommandResult = std::result::Result<HandlerOutput, CommandError>;

/// Value produced by a successful handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutput {
    /// The action completed without data
    Unit,
    /// Text to send back as is
    Text(String),
    /// Raw binary data
    Bytes(Vec<u8>),
}

/// Error type for command handling
///
/// None of these details reach the peer; they are logged by the dispatcher.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Payload does not match the command's arity or is not text
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// No command is registered under the identifier
    #[error("Unknown command: {0}")]
    UnknownCommand(u8),
    /// The action failed
    #[error("Execution error: {0}")]
    ExecutionError(ActionError),
}

impl From<ArityError> for CommandError {
    fn from(error: ArityError) -> Self {
        CommandError::InvalidArguments(error.to_string())
    }
}

/// Trait for command handlers
///
/// A handler receives arguments that were already split according to the
/// arity of the command it is registered under.
pub trait CommandHandler: Send + Sync {
    /// Execute the command with given arguments
    fn execute(&self, args: &[&str]) -> CommandResult;

    /// Get command description
    fn description(&self) -> &str;

    /// Get expected argument count (None = any number)
    fn expected_args(&self) -> Option<usize> {
        None
    }
}

/// Simple command handler (no arguments)
pub struct SimpleCommand {
    pub description: String,
    pub executor: Box<dyn Fn() -> std::result::Result<HandlerOutput, ActionError> + Send + Sync>,
}

impl CommandHandler for SimpleCommand {
    fn execute(&self, _args: &[&str]) -> CommandResult {
        (self.executor)().map_err(CommandError::ExecutionError)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn expected_args(&self) -> Option<usize> {
        Some(0)
    }
}

/// Command handler with a fixed number of arguments
pub struct ArgCommand {
    pub description: String,
    pub expected_args: usize,
    pub executor:
        Box<dyn Fn(&[&str]) -> std::result::Result<HandlerOutput, ActionError> + Send + Sync>,
}

impl CommandHandler for ArgCommand {
    fn execute(&self, args: &[&str]) -> CommandResult {
        if args.len() != self.expected_args {
            return Err(CommandError::InvalidArguments(format!(
                "expects {} arguments, got {}",
                self.expected_args,
                args.len()
            )));
        }

        (self.executor)(args).map_err(CommandError::ExecutionError)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn expected_args(&self) -> Option<usize> {
        Some(self.expected_args)
    }
}

/// Helper to create simple command handlers
pub fn simple_command<F>(description: &str, executor: F) -> Box<dyn CommandHandler>
where
    F: Fn() -> std::result::Result<HandlerOutput, ActionError> + Send + Sync + 'static,
{
    Box::new(SimpleCommand {
        description: description.to_string(),
        executor: Box::new(executor),
    })
}

/// Helper to create command handlers taking `expected_args` arguments
pub fn arg_command<F>(
    description: &str,
    expected_args: usize,
    executor: F,
) -> Box<dyn CommandHandler>
where
    F: Fn(&[&str]) -> std::result::Result<HandlerOutput, ActionError> + Send + Sync + 'static,
{
    Box::new(ArgCommand {
        description: description.to_string(),
        expected_args,
        executor: Box::new(executor),
    })
}

/// One entry of the command table
pub struct CommandSpec {
    kind: CommandKind,
    handler: Box<dyn CommandHandler>,
}

impl CommandSpec {
    pub fn id(&self) -> u8 {
        self.kind.id()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn arity(&self) -> Arity {
        self.kind.arity()
    }

    pub fn description(&self) -> &str {
        self.handler.description()
    }

    /// Split `payload` per the command's arity and run the handler
    pub fn invoke(&self, payload: &str) -> CommandResult {
        let args = self.arity().split(payload)?;
        self.handler.execute(&args)
    }
}

/// Ordered command table; a command's identifier is its position
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
}

impl CommandRegistry {
    /// Create a new empty command registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for the next command of the table
    ///
    /// Commands must be registered in identifier order, and a handler that
    /// declares an argument count must agree with the command's arity.
    pub fn register(&mut self, kind: CommandKind, handler: Box<dyn CommandHandler>) -> Result<()> {
        let position = self.commands.len();
        if usize::from(kind.id()) != position {
            return Err(DaemonError::RegistryError(format!(
                "command '{}' has id {} but would be registered at position {}",
                kind,
                kind.id(),
                position
            )));
        }

        if let Some(expected) = handler.expected_args() {
            if expected != kind.arity().count() {
                return Err(DaemonError::RegistryError(format!(
                    "handler for '{}' takes {} arguments, command arity is {}",
                    kind,
                    expected,
                    kind.arity().count()
                )));
            }
        }

        info!("Registering command {}: {}", kind.id(), kind);
        self.commands.push(CommandSpec { kind, handler });
        Ok(())
    }

    /// Check that every command of the table has a handler
    pub fn validate(&self) -> Result<()> {
        if self.commands.len() != CommandKind::ALL.len() {
            let missing: Vec<&str> = CommandKind::ALL
                .iter()
                .skip(self.commands.len())
                .map(|kind| kind.name())
                .collect();
            return Err(DaemonError::RegistryError(format!(
                "missing handlers for: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Look up a command by identifier
    pub fn lookup(&self, id: u8) -> std::result::Result<&CommandSpec, CommandError> {
        debug!("Looking up command {}", id);
        self.commands
            .get(usize::from(id))
            .ok_or(CommandError::UnknownCommand(id))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// List all registered commands with descriptions
    pub fn list_commands(&self) -> String {
        self.commands
            .iter()
            .map(|spec| format!("{} {}: {}", spec.id(), spec.name(), spec.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Shared reference to the current command table
///
/// Readers take a snapshot for the duration of one dispatch; `publish`
/// replaces the whole table at once, so a dispatch observes either the old or
/// the new table, never a mix.
#[derive(Clone)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<CommandRegistry>>>,
}

impl RegistryHandle {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// The table in effect right now
    pub fn snapshot(&self) -> Arc<CommandRegistry> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the table for all subsequent dispatches
    pub fn publish(&self, registry: CommandRegistry) {
        let replacement = Arc::new(registry);
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = replacement;
        info!("Published new command registry");
    }
}

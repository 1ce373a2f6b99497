//! Commands Module
//!
//! This module registers all available commands with the command registry.
//! It maps each entry of the command table to its action, in identifier order.

use super::command_registry::{CommandRegistry, HandlerOutput, arg_command, simple_command};
use crate::actions::screen::ScreenCapture;
use crate::actions::{filesystem, process};
use crate::config::DaemonConfig;
use crate::utils::error::Result;
use remotecmd::CommandKind;
use std::sync::Arc;
use tracing::debug;

/// Initialize all available commands in the registry
///
/// The registry is validated before it is returned, so a table with a
/// missing or misplaced command never reaches a session.
pub fn init_commands(config: &DaemonConfig) -> Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    let capture = Arc::new(ScreenCapture::new(&config.capture));
    debug!("Screen captures are stored at {}", capture.image_path().display());

    // Never invoked: the dispatcher ends the session before lookup
    registry.register(
        CommandKind::Exit,
        simple_command("Close the session", || Ok(HandlerOutput::Unit)),
    )?;

    registry.register(
        CommandKind::Dir,
        arg_command("List the entries of a directory", 1, |args| {
            Ok(HandlerOutput::Text(filesystem::list_directory(args[0])?))
        }),
    )?;

    registry.register(
        CommandKind::Delete,
        arg_command("Delete a file", 1, |args| {
            filesystem::delete_file(args[0])?;
            Ok(HandlerOutput::Unit)
        }),
    )?;

    registry.register(
        CommandKind::Copy,
        arg_command("Copy a file to a new location", 2, |args| {
            filesystem::copy_file(args[0], args[1])?;
            Ok(HandlerOutput::Unit)
        }),
    )?;

    registry.register(
        CommandKind::Execute,
        arg_command("Run a program and wait for it to finish", 1, |args| {
            process::execute_program(args[0])?;
            Ok(HandlerOutput::Unit)
        }),
    )?;

    let screenshot = Arc::clone(&capture);
    registry.register(
        CommandKind::TakeScreenshot,
        simple_command("Capture the screen to the image file", move || {
            screenshot.take_screenshot()?;
            Ok(HandlerOutput::Unit)
        }),
    )?;

    registry.register(
        CommandKind::SendPhoto,
        simple_command("Send the last captured screen image", move || {
            Ok(HandlerOutput::Bytes(capture.read_photo()?))
        }),
    )?;

    registry.validate()?;
    Ok(registry)
}

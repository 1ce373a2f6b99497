//! Command Table Module
//!
//! The closed set of commands understood by the daemon. A command's identifier
//! is its position in the table and travels as the frame type digit.

use std::fmt;
use thiserror::Error;

/// Identifier reserved for ending a session
pub const EXIT_COMMAND_ID: u8 = 0;

/// Separator between the two arguments of a two-argument command
pub const ARGUMENT_SEPARATOR: char = ' ';

/// Number of arguments a command carries in its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Payload is ignored
    NoArgs,
    /// Payload is passed verbatim as the only argument
    OneArg,
    /// Payload holds two arguments separated by exactly one space
    TwoArgs,
}

/// Raised when a payload cannot be split into the arguments its command expects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} arguments separated by a single space, found {separators} separators")]
pub struct ArityError {
    pub expected: usize,
    pub separators: usize,
}

impl Arity {
    /// Number of arguments handed to the handler
    pub fn count(self) -> usize {
        match self {
            Arity::NoArgs => 0,
            Arity::OneArg => 1,
            Arity::TwoArgs => 2,
        }
    }

    /// Split a payload into handler arguments
    pub fn split(self, payload: &str) -> Result<Vec<&str>, ArityError> {
        match self {
            Arity::NoArgs => Ok(Vec::new()),
            Arity::OneArg => Ok(vec![payload]),
            Arity::TwoArgs => {
                let separators = payload.matches(ARGUMENT_SEPARATOR).count();
                if separators != 1 {
                    return Err(ArityError {
                        expected: 2,
                        separators,
                    });
                }
                Ok(payload.splitn(2, ARGUMENT_SEPARATOR).collect())
            }
        }
    }
}

/// Canonical command table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    Exit = 0,
    Dir = 1,
    Delete = 2,
    Copy = 3,
    Execute = 4,
    TakeScreenshot = 5,
    SendPhoto = 6,
}

impl CommandKind {
    /// Every command, ordered by identifier
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Exit,
        CommandKind::Dir,
        CommandKind::Delete,
        CommandKind::Copy,
        CommandKind::Execute,
        CommandKind::TakeScreenshot,
        CommandKind::SendPhoto,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Name typed by users of the interactive client
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Exit => "exit",
            CommandKind::Dir => "dir",
            CommandKind::Delete => "delete",
            CommandKind::Copy => "copy",
            CommandKind::Execute => "execute",
            CommandKind::TakeScreenshot => "take screenshot",
            CommandKind::SendPhoto => "send photo",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            CommandKind::Exit | CommandKind::TakeScreenshot | CommandKind::SendPhoto => {
                Arity::NoArgs
            }
            CommandKind::Dir | CommandKind::Delete | CommandKind::Execute => Arity::OneArg,
            CommandKind::Copy => Arity::TwoArgs,
        }
    }

    /// Match a line of user input against the command names
    ///
    /// Accepts either the bare name or the name followed by a space and its
    /// arguments. Returns the command and its trimmed argument text.
    ///
    /// # Examples
    /// ```
    /// use remotecmd::CommandKind;
    ///
    /// let (kind, args) = CommandKind::parse_input("copy a.txt b.txt").unwrap();
    /// assert_eq!(kind, CommandKind::Copy);
    /// assert_eq!(args, "a.txt b.txt");
    /// ```
    pub fn parse_input(line: &str) -> Option<(CommandKind, &str)> {
        let line = line.trim();
        Self::ALL.iter().find_map(|kind| {
            let name = kind.name();
            if line == name {
                return Some((*kind, ""));
            }
            line.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(ARGUMENT_SEPARATOR))
                .map(|rest| (*kind, rest.trim()))
        })
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

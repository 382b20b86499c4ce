//! # Command Error Types
//!
//! Synchronous rejections returned by the command surface. Every variant is
//! detected before any side effect: a rejected command leaves the session
//! untouched and dispatches nothing.
//!
//! Display strings are what the host console shows after the command
//! signature, e.g. `ERROR: pollfish.load( [options] ), Invalid option 'foo'`.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors returned by survey bridge commands.
#[derive(Error, Debug)]
pub enum CommandError {
    // ========================================================================
    // Ordering Errors
    // ========================================================================
    /// `init` was called while a listener is registered.
    #[error("init() can only be called once")]
    AlreadyInitialized,

    /// A command other than `init` ran before `init`.
    #[error("init() must be called before calling other API functions")]
    NotInitialized,

    /// `init` was accepted but registration has not completed yet.
    #[error("The apiKey is not registered")]
    NotRegistered,

    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// Wrong number of positional arguments.
    #[error("{expected} expected. got {got}")]
    Arity { expected: &'static str, got: usize },

    /// First `init` argument is not a function.
    #[error("listener function expected, got: {got}")]
    ListenerExpected { got: &'static str },

    /// The options argument is not a table.
    #[error("options table expected. Got {got}")]
    OptionsTableExpected { got: &'static str },

    /// `setUserDetails` called without its options table.
    #[error("missing options table.")]
    MissingOptions,

    // ========================================================================
    // Option Validation Errors
    // ========================================================================
    /// Key outside the command's allow-list.
    #[error("Invalid option '{path}'")]
    UnknownOption { path: String },

    /// Key present with the wrong primitive type.
    #[error("{path} expected ({expected}). Got {got}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Required key absent.
    #[error("{path} is required")]
    MissingRequired { path: String },

    /// String value outside its enumerated set.
    #[error("{path} invalid {label} '{value}'. Valid values: {allowed}")]
    InvalidValue {
        path: String,
        label: &'static str,
        value: String,
        allowed: String,
    },

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// No command with this name is registered.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// An execution context refused the task.
    #[error("Failed to schedule task: {0}")]
    Scheduling(#[from] BridgeError),

    /// Runtime-layer failure.
    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

/// Result type for survey bridge commands
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_console_format() {
        assert_eq!(
            CommandError::Arity {
                expected: "0 or 1 argument",
                got: 2
            }
            .to_string(),
            "0 or 1 argument expected. got 2"
        );
        assert_eq!(
            CommandError::TypeMismatch {
                path: "options.padding".into(),
                expected: "number",
                got: "string"
            }
            .to_string(),
            "options.padding expected (number). Got string"
        );
        assert_eq!(
            CommandError::InvalidValue {
                path: "options.gender".into(),
                label: "gender",
                value: "bogus".into(),
                allowed: "'male', 'female', 'other'".into(),
            }
            .to_string(),
            "options.gender invalid gender 'bogus'. Valid values: 'male', 'female', 'other'"
        );
    }
}

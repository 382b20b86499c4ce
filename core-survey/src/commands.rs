//! # Command Registry
//!
//! Name-based entry point for scripting hosts. Arguments arrive as
//! positional [`OptionValue`]s; this module checks arity and argument
//! shapes in the order the host console expects, then forwards to
//! [`SurveyBridge`].
//!
//! ```ignore
//! use core_survey::commands::invoke;
//! use core_survey::{OptionTable, OptionValue};
//!
//! invoke(&bridge, "init", &[listener.into(), OptionTable::new().with("apiKey", "K").into()])?;
//! let loaded = invoke(&bridge, "isLoaded", &[])?;
//! ```

use crate::bridge::SurveyBridge;
use crate::error::{CommandError, Result};
use crate::options::OptionValue;
use std::fmt;
use tracing::error;

/// Commands exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Init,
    Load,
    Show,
    Hide,
    IsLoaded,
    SetUserDetails,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Init,
        Command::Load,
        Command::Show,
        Command::Hide,
        Command::IsLoaded,
        Command::SetUserDetails,
    ];

    /// Host-facing function name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Load => "load",
            Command::Show => "show",
            Command::Hide => "hide",
            Command::IsLoaded => "isLoaded",
            Command::SetUserDetails => "setUserDetails",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    /// Call signature printed in front of console diagnostics.
    pub fn signature(&self, library: &str) -> String {
        let params = match self {
            Command::Init => "listener, options",
            Command::Load => " [options] ",
            Command::SetUserDetails => "options",
            Command::Show | Command::Hide | Command::IsLoaded => "",
        };
        format!("{}.{}({})", library, self.name(), params)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs the command called `name` with positional `args`.
///
/// Returns the value the host call evaluates to (`isLoaded` only).
/// Rejections are logged with the command signature before being returned.
pub fn invoke(bridge: &SurveyBridge, name: &str, args: &[OptionValue]) -> Result<Option<OptionValue>> {
    let Some(command) = Command::from_name(name) else {
        let err = CommandError::UnknownCommand(name.to_string());
        error!(command = name, "{}", err);
        return Err(err);
    };

    bridge.run(command, || match command {
        Command::Init => {
            if !bridge.can_init() {
                return Err(CommandError::AlreadyInitialized);
            }
            if args.len() != 2 {
                return Err(CommandError::Arity {
                    expected: "2 arguments",
                    got: args.len(),
                });
            }
            let listener = match &args[0] {
                OptionValue::Function(handle) => handle.clone(),
                other => {
                    return Err(CommandError::ListenerExpected {
                        got: other.type_name(),
                    })
                }
            };
            let options = match &args[1] {
                OptionValue::Table(table) => table,
                other => {
                    return Err(CommandError::OptionsTableExpected {
                        got: other.type_name(),
                    })
                }
            };
            bridge.init_inner(listener, options).map(|_| None)
        }
        Command::Load => {
            bridge.ensure_operational()?;
            if args.len() > 1 {
                return Err(CommandError::Arity {
                    expected: "0 or 1 argument",
                    got: args.len(),
                });
            }
            let options = match args.first() {
                None | Some(OptionValue::Nil) => None,
                Some(OptionValue::Table(table)) => Some(table),
                Some(other) => {
                    return Err(CommandError::OptionsTableExpected {
                        got: other.type_name(),
                    })
                }
            };
            bridge.load_inner(options).map(|_| None)
        }
        Command::Show => bridge.show_inner().map(|_| None),
        Command::Hide => bridge.hide_inner().map(|_| None),
        Command::IsLoaded => bridge
            .is_loaded_inner()
            .map(|loaded| Some(OptionValue::Bool(loaded))),
        Command::SetUserDetails => {
            bridge.ensure_operational()?;
            if args.len() != 1 {
                return Err(CommandError::MissingOptions);
            }
            match &args[0] {
                OptionValue::Table(table) => bridge.set_user_details_inner(table).map(|_| None),
                other => Err(CommandError::OptionsTableExpected {
                    got: other.type_name(),
                }),
            }
        }
    })
}

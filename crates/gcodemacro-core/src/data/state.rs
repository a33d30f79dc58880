//! String-valued controller state enumerations
//!
//! The application store carries these as strings. Each enumeration parses
//! the known constants and keeps anything else as `Unknown`, which never
//! matches a known constant.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_state {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value outside the known set
            Unknown(String),
        }

        impl $name {
            /// Wire representation
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $text, )+
                    Self::Unknown(other) => other.as_str(),
                }
            }

            /// Parse a wire value; unrecognized values become `Unknown`
            pub fn parse(value: &str) -> Self {
                match value {
                    $( $text => Self::$variant, )+
                    other => Self::Unknown(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::parse(&value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_state! {
    /// Connection state of the transport to the controller
    ConnectionState {
        /// No transport open
        Disconnected => "disconnected",
        /// Transport being opened
        Connecting => "connecting",
        /// Transport open
        Connected => "connected",
        /// Transport being closed
        Disconnecting => "disconnecting",
    }
}

string_state! {
    /// The controller's current run-mode
    WorkflowState {
        /// Nothing is being sent
        Idle => "idle",
        /// A program is paused
        Paused => "paused",
        /// A program is streaming
        Running => "running",
    }
}

string_state! {
    /// Normalized machine status across controller firmwares
    MachineState {
        /// Firmware reports no machine state (e.g. Marlin)
        None => "",
        /// Ready for commands
        Idle => "idle",
        /// Executing motion
        Run => "run",
        /// Feed hold
        Hold => "hold",
        /// Jogging
        Jog => "jog",
        /// Alarm lock
        Alarm => "alarm",
        /// Safety door open
        Door => "door",
        /// Homing cycle
        Home => "home",
        /// Sleep mode
        Sleep => "sleep",
        /// G-code check mode
        Check => "check",
    }
}

impl ConnectionState {
    /// Whether the transport is open
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl WorkflowState {
    /// Whether a program is streaming
    pub fn is_running(&self) -> bool {
        matches!(self, WorkflowState::Running)
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Idle
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::None
    }
}

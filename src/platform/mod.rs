//! Controller link abstraction
//!
//! The wireless transport itself lives in the host page. This module keeps
//! the link state the session cares about and maps transport failures to
//! guidance text for the player. Transport errors never reach the game state
//! machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection state of the controller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkState {
    /// No connection attempt yet; samples are accepted (host-driven input)
    #[default]
    Idle,
    Connected { device_name: String },
    /// Link closed; samples are ignored until the next connection
    Disconnected,
}

impl LinkState {
    /// Whether new samples should be treated as live input
    pub fn accepts_samples(&self) -> bool {
        !matches!(self, LinkState::Disconnected)
    }
}

/// Failures reported by the host transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("this browser does not support wireless controllers")]
    Unsupported,
    #[error("controller not found")]
    NotFound,
    #[error("permission to use the wireless adapter was denied")]
    PermissionDenied,
    #[error("network error while talking to the controller")]
    Network,
    #[error("controller disconnected")]
    Disconnected,
    #[error("connection error: {0}")]
    Other(String),
}

impl TransportError {
    /// Classify a host error by its DOM exception name
    pub fn from_name(name: &str, message: &str) -> Self {
        match name {
            "NotFoundError" => TransportError::NotFound,
            "SecurityError" | "NotAllowedError" => TransportError::PermissionDenied,
            "NetworkError" => TransportError::Network,
            "NotSupportedError" => TransportError::Unsupported,
            _ => TransportError::Other(message.to_string()),
        }
    }

    /// Actionable advice shown alongside the error
    pub fn guidance(&self) -> &'static str {
        match self {
            TransportError::Unsupported => {
                "Use a Chromium-based browser (Chrome, Edge or Opera) over HTTPS or localhost."
            }
            TransportError::NotFound => {
                "Check that the controller shows it is advertising, restart it, disconnect it \
                 from other devices and keep it within a meter of this computer."
            }
            TransportError::PermissionDenied => {
                "Allow this browser to use the wireless adapter in the system privacy settings, \
                 then restart the browser and try again."
            }
            TransportError::Network => "Check the controller is powered on and in range.",
            TransportError::Disconnected => "Reconnect the controller to keep playing.",
            TransportError::Other(_) => "Try connecting again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_classifies() {
        assert_eq!(TransportError::from_name("NotFoundError", ""), TransportError::NotFound);
        assert_eq!(
            TransportError::from_name("SecurityError", ""),
            TransportError::PermissionDenied
        );
        assert_eq!(
            TransportError::from_name("AbortError", "user cancelled"),
            TransportError::Other("user cancelled".to_string())
        );
    }

    #[test]
    fn test_disconnected_rejects_samples() {
        assert!(LinkState::Idle.accepts_samples());
        assert!(
            LinkState::Connected {
                device_name: "Stick".to_string()
            }
            .accepts_samples()
        );
        assert!(!LinkState::Disconnected.accepts_samples());
    }
}

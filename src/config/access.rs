//! Admin passcode configuration loaded from environment variables.
//!
//! The passcode is a shared convenience gate for write commands, not a
//! credential. It is read from `ADMIN_PASSCODE` in the `.env` file.

use crate::core::access::Passcode;
use tracing::warn;

/// Passcode used when `ADMIN_PASSCODE` is not configured.
pub const DEFAULT_PASSCODE: &str = "9577";

/// Loads the admin passcode from the `ADMIN_PASSCODE` environment variable.
#[must_use]
pub fn passcode_from_env() -> Passcode {
    passcode_from(std::env::var("ADMIN_PASSCODE").ok())
}

fn passcode_from(value: Option<String>) -> Passcode {
    match value {
        Some(code) if !code.trim().is_empty() => Passcode::new(code.trim()),
        _ => {
            warn!("ADMIN_PASSCODE is not set; falling back to the default passcode");
            Passcode::new(DEFAULT_PASSCODE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_passcode_is_trimmed() {
        let passcode = passcode_from(Some(" 2468 \n".to_string()));
        assert!(passcode.matches("2468"));
        assert!(!passcode.matches(DEFAULT_PASSCODE));
    }

    #[test]
    fn test_blank_passcode_falls_back_to_default() {
        assert!(passcode_from(Some("   ".to_string())).matches(DEFAULT_PASSCODE));
        assert!(passcode_from(None).matches(DEFAULT_PASSCODE));
    }
}

/*!
 * Wi-Fi hotspot joining
 *
 * Delegates the actual join to an external routine and separates credential
 * acquisition behind a capability trait so the orchestrator never talks to
 * a terminal directly.
 */

use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::process::Command;
use tracing::info;

use crate::error::{PinError, Result};

/// SSID and password for the device hotspot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotCredentials {
    pub ssid: String,
    pub password: String,
}

impl HotspotCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let ssid = ssid.into();
        let password = password.into();
        if ssid.trim().is_empty() || password.trim().is_empty() {
            return Err(PinError::InvalidInput(
                "SSID and password are required".to_string(),
            ));
        }
        Ok(Self { ssid, password })
    }
}

/// Capability for obtaining hotspot credentials; one method so tests can
/// inject canned values and assert the prompt never fires.
pub trait CredentialSource {
    fn obtain(&self) -> Result<HotspotCredentials>;
}

/// Interactive terminal prompt
#[derive(Debug, Default)]
pub struct PromptCredentials;

impl CredentialSource for PromptCredentials {
    fn obtain(&self) -> Result<HotspotCredentials> {
        let theme = ColorfulTheme::default();
        let ssid: String = Input::with_theme(&theme)
            .with_prompt("Hotspot SSID")
            .interact_text()
            .map_err(|e| PinError::InvalidInput(format!("SSID prompt failed: {}", e)))?;
        let password = Password::with_theme(&theme)
            .with_prompt("Hotspot password")
            .interact()
            .map_err(|e| PinError::InvalidInput(format!("Password prompt failed: {}", e)))?;
        HotspotCredentials::new(ssid.trim(), password.trim())
    }
}

/// Invokes the external join routine and blocks until it returns
#[derive(Debug, Clone)]
pub struct HotspotJoiner {
    command: String,
}

impl HotspotJoiner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Run `<command> <ssid> <password>` to completion. Non-zero exit is a
    /// join failure carrying the routine's diagnostic output.
    pub fn join(&self, creds: &HotspotCredentials) -> Result<()> {
        info!(ssid = %creds.ssid, "joining hotspot");
        let output = Command::new(&self.command)
            .arg(&creds.ssid)
            .arg(&creds.password)
            .output()
            .map_err(|e| PinError::HotspotJoin {
                output: format!("failed to run '{}': {}", self.command, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diag = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(PinError::HotspotJoin { output: diag });
        }

        info!(ssid = %creds.ssid, "hotspot joined");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_reject_empty_fields() {
        assert!(HotspotCredentials::new("", "pass").is_err());
        assert!(HotspotCredentials::new("net", "  ").is_err());
        assert!(HotspotCredentials::new("net", "pass").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_join_success_on_zero_exit() {
        let joiner = HotspotJoiner::new("true");
        let creds = HotspotCredentials::new("net", "pass").unwrap();
        assert!(joiner.join(&creds).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_join_failure_on_nonzero_exit() {
        let joiner = HotspotJoiner::new("false");
        let creds = HotspotCredentials::new("net", "pass").unwrap();
        let err = joiner.join(&creds).unwrap_err();
        assert!(matches!(err, PinError::HotspotJoin { .. }));
    }

    #[test]
    fn test_join_missing_command_is_join_error() {
        let joiner = HotspotJoiner::new("pinlink-test-no-such-join-script");
        let creds = HotspotCredentials::new("net", "pass").unwrap();
        let err = joiner.join(&creds).unwrap_err();
        assert!(matches!(err, PinError::HotspotJoin { .. }));
    }
}

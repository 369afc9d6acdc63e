//! Command validation before shell execution.

use crate::error::{Error, Result};

const SHELL_METACHARACTERS: &[&str] = &[";", "&&", "||", "|", "`", "$", "\n", "\r"];

/// Checks feature commands before they are handed to `sh -c`.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    allow_shell: bool,
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self { allow_shell: true }
    }
}

impl CommandValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that also rejects shell metacharacters.
    pub fn strict() -> Self {
        Self { allow_shell: false }
    }

    /// Validates the command of `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BuildExecution`] for an empty command or one with a
    /// null byte. Strict mode also rejects shell operators and line breaks.
    pub fn validate(&self, feature: &str, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Err(Error::build(feature, "command cannot be empty"));
        }

        if command.contains('\0') {
            return Err(Error::build(feature, "command contains a null byte"));
        }

        if !self.allow_shell {
            if let Some(found) = SHELL_METACHARACTERS.iter().find(|m| command.contains(*m)) {
                return Err(Error::build(
                    feature,
                    format!(
                        "command uses {:?}, which strict mode does not allow: {}",
                        found, command
                    ),
                ));
            }
        }

        Ok(())
    }
}

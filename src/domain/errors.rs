/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fmt;
use thiserror::Error;

/// Domain-level errors that don't expose infrastructure details
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Hardware information collection failed
    #[error("Hardware collection failed: {0}")]
    HardwareCollectionFailed(String),
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Required system dependencies missing
    #[error("Missing required dependencies: {}", .0.join(", "))]
    MissingDependencies(Vec<String>),
    /// Data parsing failed
    #[error("Data parsing failed: {0}")]
    ParsingFailed(String),
}

/// Errors that abort a run before anything is submitted
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    /// Domain operation failed
    #[error("{0}")]
    Domain(#[from] DomainError),
    /// Record assembly failed
    #[error("Record generation failed: {0}")]
    GenerationFailed(String),
    /// The `--data` override could not be used
    #[error("Failed to load hardware data: {0}")]
    DataLoadFailed(String),
}

/// Errors specific to submitting records and writing the dump file
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// Domain operation failed
    #[error("{0}")]
    Domain(#[from] DomainError),
    /// Network/HTTP operation failed before a response arrived
    #[error("Network operation failed: {0}")]
    NetworkFailed(String),
    /// The API answered with a non-success status
    #[error("API request error: {reason}")]
    Rejected {
        status: u16,
        reason: String,
        body: String,
    },
    /// Serialization failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
    /// Local file operation failed
    #[error("File operation failed: {0}")]
    Io(String),
}

/// Errors raised by the vendor catalog
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The request never produced a response
    #[error("{0}")]
    RequestFailed(String),
    /// The catalog answered with a non-success status
    #[error("{reason}, ({detail})")]
    Status {
        status: u16,
        reason: String,
        detail: String,
    },
    /// The response body was not a vendor listing
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// System-level errors for adapters (not exposed to domain)
#[derive(Debug, Clone)]
pub enum SystemError {
    /// Command execution failed
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Command not found
    CommandNotFound(String),
    /// I/O operation failed
    IoError(String),
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "Command '{command}' failed")?;
                if let Some(code) = exit_code {
                    write!(f, " with exit code {code}")?;
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            SystemError::CommandNotFound(cmd) => write!(f, "Command not found: {cmd}"),
            SystemError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for SystemError {}

/// Convert system errors to domain errors (with context loss for abstraction)
impl From<SystemError> for DomainError {
    fn from(err: SystemError) -> Self {
        match err {
            SystemError::CommandFailed { command, .. } => {
                DomainError::HardwareCollectionFailed(format!("System command failed: {command}"))
            }
            SystemError::CommandNotFound(cmd) => DomainError::MissingDependencies(vec![cmd]),
            SystemError::IoError(msg) => {
                DomainError::HardwareCollectionFailed(format!("I/O error: {msg}"))
            }
        }
    }
}

/// Command execution errors
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// System error occurred
    #[error("{0}")]
    System(#[from] SystemError),
    /// Command execution failed
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<CommandError> for SystemError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::System(sys_err) => sys_err,
            CommandError::ExecutionFailed(msg) => SystemError::CommandFailed {
                command: String::new(),
                exit_code: None,
                stderr: msg,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = SystemError::CommandFailed {
            command: "lspci".to_string(),
            exit_code: Some(1),
            stderr: "pcilib: Cannot open /proc/bus/pci".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'lspci' failed with exit code 1: pcilib: Cannot open /proc/bus/pci"
        );

        let bare = SystemError::CommandFailed {
            command: "lspci".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert_eq!(bare.to_string(), "Command 'lspci' failed");
    }

    #[test]
    fn test_missing_command_maps_to_dependency() {
        let err: DomainError = SystemError::CommandNotFound("lspci".to_string()).into();
        assert!(matches!(err, DomainError::MissingDependencies(ref deps) if deps == &["lspci"]));
        assert_eq!(err.to_string(), "Missing required dependencies: lspci");
    }

    #[test]
    fn test_lookup_status_display() {
        let err = LookupError::Status {
            status: 404,
            reason: "Not Found".to_string(),
            detail: "No vendor".to_string(),
        };
        assert_eq!(err.to_string(), "Not Found, (No vendor)");
    }
}

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

//! PCI topology sources: the live `lspci` utility or a captured listing

use crate::domain::SystemError;
use crate::ports::{CommandExecutor, PciTopologySource, SystemCommand};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Flags giving numeric IDs, verbose fields and machine readable layout
pub const LSPCI_ARGS: &[&str] = &["-nnvmm"];

/// Runs `lspci -nnvmm` on the local machine
pub struct LspciCommandSource {
    command_executor: Arc<dyn CommandExecutor>,
    program: String,
}

impl LspciCommandSource {
    /// Create a source running `program` (normally `lspci`)
    pub fn new(command_executor: Arc<dyn CommandExecutor>, program: &str) -> Self {
        Self {
            command_executor,
            program: program.to_string(),
        }
    }

    fn command(&self) -> SystemCommand {
        SystemCommand::new(&self.program).args(LSPCI_ARGS)
    }
}

#[async_trait]
impl PciTopologySource for LspciCommandSource {
    async fn lspci_output(&self) -> Result<String, SystemError> {
        let command = self.command();
        let output = self.command_executor.execute(&command).await?;

        if !output.success {
            return Err(SystemError::CommandFailed {
                command: command.display(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn describe(&self) -> String {
        self.command().display()
    }
}

/// Reads `lspci -nnvmm` output captured earlier (`--file`)
pub struct CapturedLspciSource {
    path: PathBuf,
}

impl CapturedLspciSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PciTopologySource for CapturedLspciSource {
    async fn lspci_output(&self) -> Result<String, SystemError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SystemError::IoError(format!("{}: {e}", self.path.display())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandError;
    use crate::ports::CommandOutput;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct ScriptedExecutor {
        output: CommandOutput,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn execute(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
            self.seen.lock().unwrap().push(command.display());
            Ok(self.output.clone())
        }
    }

    fn executor(success: bool, stdout: &str, stderr: &str) -> Arc<ScriptedExecutor> {
        Arc::new(ScriptedExecutor {
            output: CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code: Some(if success { 0 } else { 1 }),
                success,
            },
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_runs_lspci_with_machine_readable_flags() {
        let exec = executor(true, "Slot:\t00:00.0\n\n", "");
        let source = LspciCommandSource::new(exec.clone(), "lspci");

        let output = source.lspci_output().await.unwrap();
        assert_eq!(output, "Slot:\t00:00.0\n\n");
        assert_eq!(*exec.seen.lock().unwrap(), vec!["lspci -nnvmm".to_string()]);
        assert_eq!(source.describe(), "lspci -nnvmm");
    }

    #[tokio::test]
    async fn test_failed_lspci_is_an_error() {
        let exec = executor(false, "", "pcilib: Cannot open /sys/bus/pci/devices\n");
        let source = LspciCommandSource::new(exec, "/usr/sbin/lspci");

        let err = source.lspci_output().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Command '/usr/sbin/lspci -nnvmm' failed with exit code 1: pcilib: Cannot open /sys/bus/pci/devices"
        );
    }

    #[tokio::test]
    async fn test_captured_listing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lspci.txt");
        std::fs::write(&path, "Slot:\t00:02.0\nIOMMUGroup:\t0\n\n").unwrap();

        let source = CapturedLspciSource::new(&path);
        assert_eq!(
            source.lspci_output().await.unwrap(),
            "Slot:\t00:02.0\nIOMMUGroup:\t0\n\n"
        );

        let missing = CapturedLspciSource::new(dir.path().join("missing.txt"));
        assert!(matches!(
            missing.lspci_output().await,
            Err(SystemError::IoError(_))
        ));
    }
}

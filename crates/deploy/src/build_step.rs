//! The external build step producing the contract artifacts.

use std::process::Stdio;

use crate::DeployError;

/// Run `command` (program followed by its arguments) with inherited output.
pub async fn run_build(command: &[String]) -> Result<(), DeployError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| DeployError::Build("The build command is empty".to_string()))?;
    let command_line = command.join(" ");

    tracing::info!(command = %command_line, "Building contracts...");

    let status = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| DeployError::Build(format!("Failed to run '{}': {}", command_line, e)))?;

    if !status.success() {
        return Err(DeployError::Build(format!(
            "'{}' exited with {}. Please fix compilation errors.",
            command_line, status
        )));
    }

    tracing::info!("Build successful!");
    Ok(())
}

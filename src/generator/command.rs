use crate::generator::backend::{AmyEpwBackend, AmyRequest, AmyRunResult};
use crate::generator::error::BackendError;
use async_trait::async_trait;
use bon::Builder;
use log::{debug, info};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs the generator as a child process.
///
/// The [`AmyRequest`] is written to the child's stdin as JSON and the
/// [`AmyRunResult`] is read back from its stdout as JSON. A non-zero exit
/// status is treated as the generator raising; the last non-empty line of
/// stderr becomes the error message. The child is killed when the returned
/// future is dropped, which is how timeouts and disconnects cancel a run.
#[derive(Debug, Clone, Builder)]
pub struct CommandBackend {
    #[builder(into)]
    program: String,
    #[builder(default)]
    args: Vec<String>,
}

#[async_trait]
impl AmyEpwBackend for CommandBackend {
    async fn create_amy_epw_files(
        &self,
        request: &AmyRequest,
    ) -> Result<AmyRunResult, BackendError> {
        let payload = serde_json::to_vec(request).map_err(BackendError::Encode)?;
        info!(
            "Running generator '{}' for years {:?}, stations {:?}",
            self.program, request.years, request.wmo_indices
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BackendError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A generator that exits without reading its input reports through its exit status.
            match stdin.write_all(&payload).await {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .map(str::trim)
                .rfind(|line| !line.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("generator exited with {}", output.status));
            return Err(BackendError::Raised(message));
        }

        debug!("Generator wrote {} bytes of output", output.stdout.len());
        serde_json::from_slice(&output.stdout).map_err(BackendError::InvalidOutput)
    }
}

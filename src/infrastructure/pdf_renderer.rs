// PDF rendering by piping report HTML through an external converter
use crate::application::report_service::PdfRenderer;
use crate::domain::errors::{DashboardError, DashboardResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

#[derive(Debug, Clone)]
pub struct CommandPdfRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPdfRenderer {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }
}

#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    async fn render(&self, html: &str) -> DashboardResult<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DashboardError::Export(format!("failed to start {}: {}", self.program, e)))?;

        // stdin is written concurrently with draining stdout.
        let stdin = child.stdin.take();
        let html = html.to_owned();
        let writer = tokio::spawn(async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(html.as_bytes()).await,
                None => Ok(()),
            }
        });

        let (output, written) = timeout(self.timeout, async {
            let output = child.wait_with_output().await;
            (output, writer.await)
        })
        .await
        .map_err(|_| DashboardError::Timeout(format!("{} did not finish", self.program)))?;
        let output = output.map_err(|e| DashboardError::Export(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(DashboardError::Export(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        match written {
            Ok(Ok(())) => Ok(output.stdout),
            Ok(Err(e)) => Err(DashboardError::Export(format!("failed to write HTML: {}", e))),
            Err(e) => Err(DashboardError::Export(format!("HTML writer stopped: {}", e))),
        }
    }
}

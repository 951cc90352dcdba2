// src/pdf.rs
//! HTML to PDF rendering through an external converter

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str, output: &Path) -> Result<()>;
}

/// Pipes the document into `wkhtmltopdf` on stdin
pub struct WkhtmltopdfRenderer {
    binary: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn render(&self, html: &str, output: &Path) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .arg("--quiet")
            .arg("--encoding")
            .arg("utf-8")
            .arg("-")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to execute {}", self.binary.display()))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .context("Failed to open renderer stdin")?;
            stdin
                .write_all(html.as_bytes())
                .context("Failed to stream HTML to renderer")?;
        }

        let result = child
            .wait_with_output()
            .context("Failed to wait for renderer")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stdout = String::from_utf8_lossy(&result.stdout);
            anyhow::bail!(
                "PDF rendering failed: stderr={}, stdout={}",
                stderr,
                stdout
            );
        }

        info!("Rendered PDF to {}", output.display());
        Ok(())
    }
}

//! ReadabilityCli — extracts readable page text via the readability-cli tool.
//!
//! Pipeline: URL → `npx -y readability-cli --properties text-content
//! --low-confidence=exit <url>` → stdout. The `--low-confidence=exit` flag
//! makes the tool exit non-zero when it is not confident the page is an
//! article, which surfaces here as a soft extraction miss.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use marque_core::defaults::EXTRACTION_CMD_TIMEOUT_SECS;
use marque_core::{ContentExtractor, Error, Result};

pub struct ReadabilityCli {
    timeout_secs: u64,
}

impl ReadabilityCli {
    pub fn new() -> Self {
        Self {
            timeout_secs: EXTRACTION_CMD_TIMEOUT_SECS,
        }
    }

    /// Override the subprocess timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ReadabilityCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for ReadabilityCli {
    async fn extract(&self, url: &str) -> Result<String> {
        debug!(
            subsystem = "jobs",
            component = "readability_cli",
            url,
            "Running readability-cli"
        );

        // The URL is passed as a discrete argument; no shell is involved.
        let mut cmd = Command::new("npx");
        cmd.arg("-y")
            .arg("readability-cli")
            .arg("--properties")
            .arg("text-content")
            .arg("--low-confidence=exit")
            .arg(url);

        let output = tokio::time::timeout(Duration::from_secs(self.timeout_secs), cmd.output())
            .await
            .map_err(|_| {
                Error::Extraction(format!(
                    "readability-cli timed out after {}s",
                    self.timeout_secs
                ))
            })?
            .map_err(|e| Error::Extraction(format!("failed to run readability-cli: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(format!(
                "readability-cli exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(Error::Extraction("no readable content extracted".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let extractor = ReadabilityCli::new();
        assert_eq!(extractor.timeout_secs, EXTRACTION_CMD_TIMEOUT_SECS);
    }

    #[test]
    fn test_with_timeout() {
        let extractor = ReadabilityCli::new().with_timeout(5);
        assert_eq!(extractor.timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_extraction_failures_are_soft() {
        // An unreachable npx/tool or a refusing page must come back as an
        // Extraction error, which tasks treat as "nothing to do".
        let extractor = ReadabilityCli::new().with_timeout(1);
        let err = extractor
            .extract("https://127.0.0.1:1/__nonexistent__")
            .await
            .unwrap_err();
        assert!(err.is_soft(), "got {err:?}");
    }
}

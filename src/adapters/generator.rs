//! char-rnn sampling adapter.
//!
//! Spawns `th sample.lua <checkpoint> -seed <n> -length <n>` from the
//! char-rnn checkout and collects what it prints.

use std::process::Stdio;
use std::string::FromUtf8Error;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

use super::Sampler;
use crate::config::GeneratorSettings;

/// Errors from a generator run
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Failed to spawn generator '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for generator: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("Sample ended with code {code}: {stderr}")]
    Exit { code: i32, stderr: String },

    #[error("Sample error: {0}")]
    Stderr(String),

    #[error("Generator output is not valid UTF-8: {0}")]
    InvalidOutput(#[from] FromUtf8Error),
}

/// Sampler backed by a char-rnn checkout
#[derive(Debug, Clone)]
pub struct CharRnnSampler {
    settings: GeneratorSettings,
}

impl CharRnnSampler {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn command(&self, seed: u64, length: usize) -> Command {
        let mut command = Command::new(&self.settings.binary);
        command
            .arg(&self.settings.script)
            .arg(&self.settings.checkpoint)
            .arg("-seed")
            .arg(seed.to_string())
            .arg("-length")
            .arg(length.to_string())
            .current_dir(&self.settings.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Sampler for CharRnnSampler {
    fn name(&self) -> &str {
        "char-rnn"
    }

    async fn sample(&self, seed: u64, length: usize) -> Result<String, SampleError> {
        let child = self
            .command(seed, length)
            .spawn()
            .map_err(|source| SampleError::Spawn {
                binary: self.settings.binary.clone(),
                source,
            })?;

        let output = timeout(self.settings.timeout, child.wait_with_output())
            .await
            .map_err(|_| SampleError::Timeout(self.settings.timeout))?
            .map_err(SampleError::Wait)?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(SampleError::Exit {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        // Anything on stderr counts as a failed sample, even with a clean exit
        if !stderr.is_empty() {
            return Err(SampleError::Stderr(stderr));
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

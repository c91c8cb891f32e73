use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to launch speech program '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("speech program '{program}' exited with {status}")]
    Failed { program: String, status: String },
}

/// Something that can say a short phrase out loud. Calls may block.
pub trait SpeechEngine: Send {
    fn name(&self) -> String;
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// TTS program invoked with the phrase as its last argument.
    pub program: String,
    pub args: Vec<String>,
    /// Pending phrases held while the engine is busy.
    pub queue_depth: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let program = if cfg!(target_os = "macos") { "say" } else { "espeak-ng" };
        Self {
            program: program.to_string(),
            args: Vec::new(),
            queue_depth: 4,
        }
    }
}

/// Speaks through an external TTS command (`say`, `espeak-ng`, ...).
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl SpeechEngine for CommandSpeech {
    fn name(&self) -> String {
        format!("command ({})", self.program)
    }

    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        debug!(program = %self.program, text, "speaking");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| SpeechError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Writes phrases to the log instead of the speakers.
pub struct LogSpeech;

impl SpeechEngine for LogSpeech {
    fn name(&self) -> String {
        "muted".to_string()
    }

    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        info!("(muted) {}", text);
        Ok(())
    }
}

//! Dialog extraction state machine.
//!
//! Each line is classified, then fed through [`transition`], a pure
//! function of the current state, the line's classification and the
//! new-shot flag. Effects on the accumulator are returned as data and
//! applied by [`DialogExtractor`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::classifier::{classify, Classification};

/// Failure to read a transcript document
#[derive(Debug, Error)]
#[error("Failed to read document {}: {source}", path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Extraction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractState {
    /// Before the first shot header
    Start,

    /// After a blank line, waiting for the next block
    Break,

    /// Inside a (possibly multi-line) shot header
    Shot,

    /// Inside a stage direction block
    Direction,

    /// Inside a dialog block
    Dialog,
}

impl ExtractState {
    pub const ALL: [ExtractState; 5] = [
        ExtractState::Start,
        ExtractState::Break,
        ExtractState::Shot,
        ExtractState::Direction,
        ExtractState::Dialog,
    ];
}

/// What a transition does to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,

    /// Append the trimmed line followed by `": "`
    AppendSpeaker,

    /// Append the trimmed line followed by a space
    AppendLine,

    /// Terminate the dialog block with `"\n"`
    AppendNewline,
}

/// Result of one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: ExtractState,
    pub is_new_shot: bool,
    pub effect: Effect,
}

impl Transition {
    fn to(state: ExtractState, is_new_shot: bool) -> Self {
        Self {
            state,
            is_new_shot,
            effect: Effect::None,
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

/// Compute the next state for one classified line.
///
/// Total over every (state, classification) pair. Checks within a state
/// run in precedence order; anything unmatched stays put.
pub fn transition(
    state: ExtractState,
    line: &Classification,
    is_new_shot: bool,
) -> Transition {
    use ExtractState::*;

    match state {
        Start => {
            if line.shot_header {
                Transition::to(Shot, true)
            } else {
                Transition::to(Start, is_new_shot)
            }
        }
        Break => {
            if line.shot_header {
                Transition::to(Shot, true)
            } else if line.dialog_start {
                Transition::to(Dialog, is_new_shot).with(Effect::AppendSpeaker)
            } else if line.direction_start && !line.content_free {
                Transition::to(Direction, is_new_shot)
            } else {
                Transition::to(Break, is_new_shot)
            }
        }
        Shot => {
            if line.blank {
                Transition::to(Break, is_new_shot)
            } else {
                Transition::to(Shot, is_new_shot)
            }
        }
        Direction => {
            if line.blank {
                Transition::to(Break, false)
            } else {
                // Direction text is never emitted, new shot or not
                Transition::to(Direction, is_new_shot)
            }
        }
        Dialog => {
            if line.blank {
                Transition::to(Break, is_new_shot).with(Effect::AppendNewline)
            } else {
                Transition::to(Dialog, is_new_shot).with(Effect::AppendLine)
            }
        }
    }
}

/// Split a document into lines. `\n` and `\r` each end a line, so a CRLF
/// pair produces an empty line between them.
pub fn split_lines(document: &str) -> impl Iterator<Item = &str> {
    document.split(['\n', '\r'])
}

/// Runs the state machine over one document
#[derive(Debug, Clone)]
pub struct DialogExtractor {
    state: ExtractState,
    is_new_shot: bool,
    output: String,
}

impl Default for DialogExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogExtractor {
    pub fn new() -> Self {
        Self {
            state: ExtractState::Start,
            is_new_shot: false,
            output: String::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> ExtractState {
        self.state
    }

    /// Whether the last shot header has not yet been followed by a
    /// completed direction block
    pub fn is_new_shot(&self) -> bool {
        self.is_new_shot
    }

    /// Feed one line
    pub fn push_line(&mut self, line: &str) {
        let next = transition(self.state, &classify(line), self.is_new_shot);

        if self.is_new_shot
            && self.state == ExtractState::Direction
            && next.state == ExtractState::Direction
        {
            tracing::trace!(line, "Dropping direction of a new shot");
        }

        match next.effect {
            Effect::None => {}
            Effect::AppendSpeaker => {
                self.output.push_str(line.trim());
                self.output.push_str(": ");
            }
            Effect::AppendLine => {
                self.output.push_str(line.trim());
                self.output.push(' ');
            }
            Effect::AppendNewline => self.output.push('\n'),
        }

        self.state = next.state;
        self.is_new_shot = next.is_new_shot;
    }

    /// Consume the extractor and return the dialog gathered so far
    pub fn finish(self) -> String {
        self.output
    }
}

/// Extract the dialog from a whole document
pub fn extract_dialog(document: &str) -> String {
    let mut extractor = DialogExtractor::new();
    for line in split_lines(document) {
        extractor.push_line(line);
    }
    extractor.finish()
}

/// Read a transcript file and extract its dialog.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub async fn extract_file(path: &Path) -> Result<String, ReadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let document = String::from_utf8_lossy(&bytes);
    Ok(extract_dialog(&document))
}

//! Screenplay dialog extraction.
//!
//! Transcripts follow a tab-indented screenplay layout:
//!
//! ```text
//! 12   INT. BRIDGE              <- shot header (discarded)
//!
//! \tPicard turns.               <- stage direction (discarded)
//!
//! \t\t\t\t\tPICARD              <- speaker
//! \t\t\tMake it so.             <- dialog
//! ```
//!
//! - `classifier`: line categories
//! - `machine`: the extraction state machine

pub mod classifier;
pub mod machine;

pub use classifier::{classify, Classification, LineKind};
pub use machine::{
    extract_dialog, extract_file, split_lines, transition, DialogExtractor, Effect, ExtractState,
    ReadError, Transition,
};

//! scriptbot - Screenplay dialog corpus builder and tweet bot
//!
//! Extracts the spoken dialog from tab-indented screenplay transcripts
//! into a training corpus for a character-level text generator, then
//! turns the generator's output into tweets and posts them on a timer.
//!
//! # Modules
//!
//! - `screenplay`: Line classifier and dialog extraction state machine
//! - `corpus`: Sequential corpus building with a backpressured sink
//! - `tweet`: Tweet candidate filter and the posting loop
//! - `adapters`: External systems (char-rnn generator, Twitter)
//! - `config`: Config file, environment overrides, credentials
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build data/input.txt from data/raw/tng/
//! scriptbot build-corpus
//!
//! # Tweet now and every four hours
//! scriptbot run-tweet-loop
//!
//! # Preview a single tweet without posting
//! scriptbot run-tweet-loop --once --dry-run
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod screenplay;
pub mod tweet;

// Re-export main types at crate root for convenience
pub use corpus::{CorpusBuilder, CorpusError};
pub use screenplay::{extract_dialog, extract_file, DialogExtractor, ExtractState, ReadError};
pub use tweet::{TweetBot, TweetFilter, TweetSettings};

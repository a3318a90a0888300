//! Tweet generation.
//!
//! - `filter`: picks dialog-shaped lines out of generated text
//! - `bot`: sample → filter → post loop on a timer

pub mod bot;
pub mod filter;

pub use bot::{PostedTweet, TweetBot, TweetError, TweetSettings};
pub use filter::{target_line_count, QuotePair, TweetFilter, MAX_TWEET_CHARS};

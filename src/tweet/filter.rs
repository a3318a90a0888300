//! Turns raw generator output into a tweet.
//!
//! Generated text is mostly noise around lines shaped like the corpus,
//! `SPEAKER: words`. Those lines are pulled out, screened for obvious
//! punctuation damage, then a few of them are stitched into one tweet.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

/// Character budget of a tweet
pub const MAX_TWEET_CHARS: usize = 140;

static DIALOG_LINE: OnceLock<Regex> = OnceLock::new();

fn dialog_line() -> &'static Regex {
    DIALOG_LINE.get_or_init(|| {
        Regex::new(r"[A-Z/ ()Oo.Ss.Cc]+: .+\n")
            .unwrap_or_else(|e| panic!("invalid dialog line pattern: {e}"))
    })
}

/// Opening and closing quote characters checked for balance.
///
/// The default pair is `"` and `"`, which compares a count with itself and
/// never rejects anything. Known defect, kept for output compatibility;
/// use [`QuotePair::typographic`] for a real check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub open: char,
    pub close: char,
}

impl QuotePair {
    pub const fn straight() -> Self {
        Self {
            open: '"',
            close: '"',
        }
    }

    pub const fn typographic() -> Self {
        Self {
            open: '\u{201C}',
            close: '\u{201D}',
        }
    }
}

impl Default for QuotePair {
    fn default() -> Self {
        Self::straight()
    }
}

/// Line count to aim for: `sqrt(u) * 3`, favouring short tweets
pub fn target_line_count<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>().sqrt() * 3.0
}

fn count(line: &str, ch: char) -> usize {
    line.chars().filter(|c| *c == ch).count()
}

/// Candidate extraction and tweet assembly
#[derive(Debug, Clone)]
pub struct TweetFilter {
    quotes: QuotePair,
    max_chars: usize,
}

impl Default for TweetFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetFilter {
    pub fn new() -> Self {
        Self {
            quotes: QuotePair::default(),
            max_chars: MAX_TWEET_CHARS,
        }
    }

    pub fn with_quotes(mut self, quotes: QuotePair) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Every dialog-shaped line in the sample, newline included
    pub fn candidates<'a>(&self, sample: &'a str) -> Vec<&'a str> {
        dialog_line()
            .find_iter(sample)
            .map(|m| m.as_str())
            .filter(|line| self.is_acceptable(line))
            .collect()
    }

    /// Balanced parentheses, balanced quotes, and short enough on its own
    pub fn is_acceptable(&self, line: &str) -> bool {
        if count(line, '(') != count(line, ')') {
            return false;
        }
        if count(line, self.quotes.open) != count(line, self.quotes.close) {
            return false;
        }
        line.chars().count() <= self.max_chars
    }

    /// Append lines in order until the target count or the character
    /// budget is reached, then drop the final newline.
    ///
    /// The budget is checked before each line, so the last line may run
    /// past it.
    pub fn assemble(&self, lines: &[&str], target_lines: f64) -> Option<String> {
        let mut tweet = String::new();
        let mut chars = 0;

        for (i, line) in lines.iter().enumerate() {
            if i as f64 >= target_lines || chars >= self.max_chars {
                break;
            }
            tweet.push_str(line);
            chars += line.chars().count();
        }

        if tweet.is_empty() {
            return None;
        }

        tweet.pop();
        Some(tweet)
    }

    /// Extract a tweet from a sample, or `None` if nothing usable is in it
    pub fn extract<R: Rng + ?Sized>(&self, sample: &str, rng: &mut R) -> Option<String> {
        let lines = self.candidates(sample);
        if lines.is_empty() {
            return None;
        }
        self.assemble(&lines, target_line_count(rng))
    }
}

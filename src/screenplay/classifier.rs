//! Line classification for screenplay transcripts.
//!
//! A transcript line can match several categories at once (an all-caps
//! direction line is both a direction start and content free). The
//! classifier reports every match; precedence belongs to the state machine.

use std::sync::OnceLock;

use regex::Regex;

/// A syntactic category a line can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Numbered shot header, e.g. `12   INT. BRIDGE`
    ShotHeader,

    /// Speaker name indented by exactly five tabs
    DialogStart,

    /// Stage direction indented by a single tab
    DirectionStart,

    /// Empty or whitespace only
    Blank,

    /// No lowercase letters (formatting artifacts, all-caps headings)
    ContentFree,
}

impl LineKind {
    /// Every kind, in declaration order
    pub const ALL: [LineKind; 5] = [
        LineKind::ShotHeader,
        LineKind::DialogStart,
        LineKind::DirectionStart,
        LineKind::Blank,
        LineKind::ContentFree,
    ];
}

/// The set of categories one line matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub shot_header: bool,
    pub dialog_start: bool,
    pub direction_start: bool,
    pub blank: bool,
    pub content_free: bool,
}

impl Classification {
    /// Classification matching exactly the given kinds
    pub fn of(kinds: &[LineKind]) -> Self {
        let mut classification = Self::default();
        for kind in kinds {
            match kind {
                LineKind::ShotHeader => classification.shot_header = true,
                LineKind::DialogStart => classification.dialog_start = true,
                LineKind::DirectionStart => classification.direction_start = true,
                LineKind::Blank => classification.blank = true,
                LineKind::ContentFree => classification.content_free = true,
            }
        }
        classification
    }

    /// Check whether the line matched a kind
    pub fn contains(&self, kind: LineKind) -> bool {
        match kind {
            LineKind::ShotHeader => self.shot_header,
            LineKind::DialogStart => self.dialog_start,
            LineKind::DirectionStart => self.direction_start,
            LineKind::Blank => self.blank,
            LineKind::ContentFree => self.content_free,
        }
    }

    /// Matched kinds, in declaration order
    pub fn kinds(&self) -> Vec<LineKind> {
        LineKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }
}

struct Patterns {
    shot_header: Regex,
    dialog_start: Regex,
    direction_start: Regex,
    blank: Regex,
    content_free: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid line pattern {pattern:?}: {e}"))
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        shot_header: compile(r"^[0-9]+\s"),
        dialog_start: compile(r"^\t{5}[A-Z]"),
        direction_start: compile(r"^\t[A-Za-z0-9]"),
        blank: compile(r"^\s*$"),
        content_free: compile(r"^[^a-z]*$"),
    })
}

/// Classify a single line (without its line break)
pub fn classify(line: &str) -> Classification {
    let patterns = patterns();
    Classification {
        shot_header: patterns.shot_header.is_match(line),
        dialog_start: patterns.dialog_start.is_match(line),
        direction_start: patterns.direction_start.is_match(line),
        blank: patterns.blank.is_match(line),
        content_free: patterns.content_free.is_match(line),
    }
}

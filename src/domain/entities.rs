//! Domain entities: node kinds, branches, answers and tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical tag line written before a question record.
pub const QUESTION_TAG: &str = "Q:";
/// Canonical tag line written before an answer record.
pub const ANSWER_TAG: &str = "A:";

/// Discriminates internal question nodes from guessable leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Yes/no question with exactly two children
    Question,
    /// Guessable object, always a leaf
    Answer,
}

impl NodeKind {
    /// Tag line used when this kind is written to a document.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Question => QUESTION_TAG,
            NodeKind::Answer => ANSWER_TAG,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Question => write!(f, "question"),
            NodeKind::Answer => write!(f, "answer"),
        }
    }
}

/// One of the two child slots of a question node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Yes,
    No,
}

impl Branch {
    /// Branch taken for a raw console answer.
    pub fn from_answer(answer: &str) -> Self {
        if is_affirmative(answer) {
            Branch::Yes
        } else {
            Branch::No
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Yes => write!(f, "yes"),
            Branch::No => write!(f, "no"),
        }
    }
}

/// Interpret a raw answer: yes iff it starts with `y` after trimming and case folding.
///
/// Everything else, including empty input, is a no. There is no re-prompt.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with('y')
}

/// Node text as stored in a document record: line breaks become spaces.
pub fn single_line(value: impl Into<String>) -> String {
    let value = value.into();
    let is_break = |c: char| c == '\n' || c == '\r';
    if value.contains(is_break) {
        value.replace(is_break, " ")
    } else {
        value
    }
}

/// How tag lines are recognised when reading a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatching {
    /// Any tag containing `Q` is a question, anything else an answer.
    /// Accepts hand-edited files.
    #[default]
    Loose,
    /// Tag must be exactly `Q:` or `A:` (surrounding whitespace ignored).
    Strict,
}

impl TagMatching {
    /// Classify a tag line. `None` means the tag is not acceptable.
    pub fn classify(self, tag: &str) -> Option<NodeKind> {
        match self {
            TagMatching::Loose => {
                if tag.contains('Q') {
                    Some(NodeKind::Question)
                } else {
                    Some(NodeKind::Answer)
                }
            }
            TagMatching::Strict => match tag.trim() {
                QUESTION_TAG => Some(NodeKind::Question),
                ANSWER_TAG => Some(NodeKind::Answer),
                _ => None,
            },
        }
    }
}

impl fmt::Display for TagMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagMatching::Loose => write!(f, "loose"),
            TagMatching::Strict => write!(f, "strict"),
        }
    }
}

/// Expand environment variables and tilde in a path string.
/// Falls back to the input unchanged if expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

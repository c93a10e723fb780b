//! Tree builder for reading question documents.
//!
//! A document is a flat list of `(tag, text)` line pairs in pre-order: a question
//! record is followed by its complete yes subtree, then its complete no subtree.
//! There are no length or bracket markers, the shape follows from the read order.

use std::str::FromStr;

use generational_arena::Arena;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, QuestionNode, QuestionTree};
use crate::domain::entities::{NodeKind, TagMatching};
use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// One `(tag, text)` pair of a document.
#[derive(Debug)]
struct Record {
    kind: NodeKind,
    value: String,
    line: usize,
}

/// Constructs question trees from documents.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    matching: TagMatching,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matching(matching: TagMatching) -> Self {
        Self { matching }
    }

    /// Parse a whole document held in memory.
    pub fn parse_str(&self, document: &str) -> TreeResult<QuestionTree> {
        self.parse_lines(document.lines())
    }

    /// Parse a document from its lines.
    ///
    /// Fails with `MalformedDocument` when the lines run out while a subtree is
    /// still expected, when a record lacks its text line, when a tag is rejected
    /// under strict matching, or when non-blank lines follow the complete tree.
    #[instrument(level = "debug", skip(self, lines))]
    pub fn parse_lines<I, S>(&self, lines: I) -> TreeResult<QuestionTree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = self.read_records(lines)?;
        debug!("read {} records", records.len());
        Self::assemble(records)
    }

    /// Read exactly the records of one strict binary tree.
    ///
    /// `pending` counts subtrees announced but not yet started: every record
    /// fills one, every question announces two more.
    fn read_records<I, S>(&self, lines: I) -> TreeResult<Vec<Record>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = lines.into_iter();
        let mut line_no = 0;
        let mut records = Vec::new();
        let mut pending: usize = 1;

        while pending > 0 {
            let Some(tag) = lines.next() else {
                return Err(DomainError::malformed(
                    line_no + 1,
                    format!(
                        "document ended while {} subtree(s) were still expected",
                        pending
                    ),
                ));
            };
            line_no += 1;
            let tag_line = line_no;
            let tag = tag.as_ref();
            let kind = self.matching.classify(tag).ok_or_else(|| {
                DomainError::malformed(tag_line, format!("unrecognised tag '{}'", tag))
            })?;

            let Some(value) = lines.next() else {
                return Err(DomainError::malformed(
                    tag_line + 1,
                    format!("{} record has no text line", kind),
                ));
            };
            line_no += 1;
            trace!("line {}: {} '{}'", tag_line, kind, value.as_ref());

            pending -= 1;
            if kind == NodeKind::Question {
                pending += 2;
            }
            records.push(Record {
                kind,
                value: value.as_ref().to_string(),
                line: tag_line,
            });
        }

        for rest in lines {
            line_no += 1;
            if !rest.as_ref().trim().is_empty() {
                return Err(DomainError::malformed(
                    line_no,
                    "unexpected content after the last record",
                ));
            }
        }
        Ok(records)
    }

    /// Build bottom-up from the last record: a question's yes subtree root is on
    /// top of the stack, its no subtree root right below.
    fn assemble(records: Vec<Record>) -> TreeResult<QuestionTree> {
        let mut arena = Arena::with_capacity(records.len());
        let mut built: Vec<NodeId> = Vec::new();

        for record in records.into_iter().rev() {
            let id = match record.kind {
                NodeKind::Answer => arena.insert(QuestionNode::answer(record.value)),
                NodeKind::Question => {
                    let (Some(yes), Some(no)) = (built.pop(), built.pop()) else {
                        return Err(DomainError::malformed(
                            record.line,
                            "question is missing a subtree",
                        ));
                    };
                    arena.insert(QuestionNode::question(record.value, yes, no))
                }
            };
            built.push(id);
        }

        match (built.pop(), built.is_empty()) {
            (Some(root), true) => Ok(QuestionTree::from_arena(arena, root)),
            _ => Err(DomainError::InternalConsistency(
                "document records do not form a single tree".to_string(),
            )),
        }
    }
}

/// Parses with loose tag matching.
impl FromStr for QuestionTree {
    type Err = DomainError;

    fn from_str(document: &str) -> Result<Self, Self::Err> {
        TreeBuilder::new().parse_str(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Branch;
    use rstest::rstest;

    #[test]
    fn given_three_record_document_when_parsing_then_builds_question_with_two_leaves() {
        let tree = TreeBuilder::new()
            .parse_lines(["Q:", "Has fur?", "A:", "Cat", "A:", "Fish"])
            .unwrap();

        let root = tree.node(tree.root()).unwrap();
        assert!(root.is_question());
        assert_eq!(root.value(), "Has fur?");
        let yes = tree.child(tree.root(), Branch::Yes).unwrap();
        let no = tree.child(tree.root(), Branch::No).unwrap();
        assert_eq!(tree.node(yes).unwrap().value(), "Cat");
        assert_eq!(tree.node(no).unwrap().value(), "Fish");
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn given_nested_document_when_parsing_then_yes_subtree_precedes_no_subtree() {
        let document = "Q:\nIs it an animal?\nQ:\nDoes it bark?\nA:\nDog\nA:\nCat\nA:\nRock\n";

        let tree: QuestionTree = document.parse().unwrap();

        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.objects(), ["Dog", "Cat", "Rock"]);
        let no = tree.child(tree.root(), Branch::No).unwrap();
        assert_eq!(tree.node(no).unwrap().value(), "Rock");
    }

    #[test]
    fn given_single_answer_document_when_parsing_then_builds_leaf() {
        let tree: QuestionTree = "A:\ncomputer\n".parse().unwrap();
        assert_eq!(tree, QuestionTree::from_object("computer"));
    }

    #[test]
    fn given_loose_tags_when_parsing_then_contains_q_selects_question() {
        let tree = TreeBuilder::new()
            .parse_lines(["Question", "Big?", "answer", "Whale", "", "Ant"])
            .unwrap();

        assert_eq!(tree.to_lines(), ["Q:", "Big?", "A:", "Whale", "A:", "Ant"]);
    }

    #[test]
    fn given_strict_matching_when_tag_is_loose_then_malformed() {
        let result = TreeBuilder::with_matching(TagMatching::Strict)
            .parse_lines(["Question", "Big?", "A:", "Whale", "A:", "Ant"]);

        assert_eq!(result, Err(DomainError::malformed(1, "unrecognised tag 'Question'")));
    }

    #[rstest]
    #[case::empty(&[], 1)]
    #[case::missing_text(&["A:"], 2)]
    #[case::missing_no_subtree(&["Q:", "Has fur?", "A:", "Cat"], 5)]
    #[case::missing_both_subtrees(&["Q:", "Has fur?"], 3)]
    #[case::truncated_mid_record(&["Q:", "Has fur?", "A:", "Cat", "A:"], 6)]
    #[case::trailing_record(&["A:", "Cat", "A:", "Dog"], 3)]
    fn given_incomplete_document_when_parsing_then_malformed(
        #[case] lines: &[&str],
        #[case] line: usize,
    ) {
        let result = TreeBuilder::new().parse_lines(lines.iter());

        match result {
            Err(DomainError::MalformedDocument { line: at, .. }) => assert_eq!(at, line),
            other => panic!("expected MalformedDocument, got {:?}", other),
        }
    }

    #[test]
    fn given_trailing_blank_lines_when_parsing_then_ignored() {
        let tree = TreeBuilder::new()
            .parse_lines(["A:", "Cat", "", "  "])
            .unwrap();
        assert_eq!(tree.objects(), ["Cat"]);
    }
}

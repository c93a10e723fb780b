use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::entities::{single_line, Branch, NodeKind};
use crate::domain::error::DomainError;

/// Handle of a node in the question arena.
pub type NodeId = Index;

/// Levels rendered by [`QuestionTree::to_termtree`] before the rest is summarised.
pub const MAX_RENDER_DEPTH: usize = 64;

/// A question (with exactly two children) or a guessable object (a leaf).
#[derive(Debug, Clone)]
pub struct QuestionNode {
    value: String,
    kind: NodeKind,
    yes: Option<NodeId>,
    no: Option<NodeId>,
}

impl QuestionNode {
    pub(crate) fn answer(value: impl Into<String>) -> Self {
        Self {
            value: single_line(value),
            kind: NodeKind::Answer,
            yes: None,
            no: None,
        }
    }

    pub(crate) fn question(value: impl Into<String>, yes: NodeId, no: NodeId) -> Self {
        Self {
            value: single_line(value),
            kind: NodeKind::Question,
            yes: Some(yes),
            no: Some(no),
        }
    }

    /// Question text or object name.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_question(&self) -> bool {
        self.kind == NodeKind::Question
    }

    pub fn is_answer(&self) -> bool {
        self.kind == NodeKind::Answer
    }

    /// Child in the given slot, `None` for answers.
    pub fn child(&self, branch: Branch) -> Option<NodeId> {
        match branch {
            Branch::Yes => self.yes,
            Branch::No => self.no,
        }
    }

    fn slot_mut(&mut self, branch: Branch) -> &mut Option<NodeId> {
        match branch {
            Branch::Yes => &mut self.yes,
            Branch::No => &mut self.no,
        }
    }
}

/// Arena-backed strict binary tree of questions and objects.
///
/// Nodes are addressed by generational handles, so "which slot holds this leaf"
/// is a handle comparison and never a comparison of text. The tree is never
/// empty: it starts as a single object and only grows through [`learn`].
///
/// [`learn`]: QuestionTree::learn
#[derive(Debug, Clone)]
pub struct QuestionTree {
    arena: Arena<QuestionNode>,
    root: NodeId,
}

impl QuestionTree {
    /// Single-leaf tree for a game with no prior knowledge.
    pub fn from_object(name: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(QuestionNode::answer(name));
        Self { arena, root }
    }

    pub(crate) fn from_arena(arena: Arena<QuestionNode>, root: NodeId) -> Self {
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&QuestionNode> {
        self.arena.get(id)
    }

    /// Child of `id` in the given slot; `None` for answers and dangling handles.
    pub fn child(&self, id: NodeId, branch: Branch) -> Option<NodeId> {
        self.node(id).and_then(|node| node.child(branch))
    }

    /// Slot of `parent` that holds exactly the handle `child`.
    pub fn branch_of(&self, parent: NodeId, child: NodeId) -> Option<Branch> {
        let node = self.node(parent)?;
        if node.yes == Some(child) {
            Some(Branch::Yes)
        } else if node.no == Some(child) {
            Some(Branch::No)
        } else {
            None
        }
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn question_count(&self) -> usize {
        self.iter().filter(|(_, node)| node.is_question()).count()
    }

    /// Object names in pre-order (yes side first).
    pub fn objects(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.is_answer())
            .map(|(_, node)| node.value())
            .collect()
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        self.depth_from(self.root)
    }

    /// Number of nodes on the longest path from `id` down to a leaf.
    fn depth_from(&self, id: NodeId) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(id, 1)];
        while let Some((id, level)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            deepest = deepest.max(level);
            for branch in [Branch::No, Branch::Yes] {
                if let Some(child) = node.child(branch) {
                    stack.push((child, level + 1));
                }
            }
        }
        deepest
    }

    /// Pre-order traversal: node, yes subtree, no subtree.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Replace the superseded leaf with a new question distinguishing it from `object`.
    ///
    /// `parent` is the question whose slot currently holds `superseded`, or `None`
    /// when `superseded` is the root. The new question gets the new object on its
    /// yes side when `yes_means_new_object`, otherwise on its no side; the superseded
    /// leaf keeps its handle and value. On error the tree is left untouched.
    ///
    /// Returns the handle of the new question node.
    #[instrument(level = "debug", skip(self, question, object))]
    pub fn learn(
        &mut self,
        parent: Option<NodeId>,
        question: impl Into<String>,
        superseded: NodeId,
        object: impl Into<String>,
        yes_means_new_object: bool,
    ) -> Result<NodeId, DomainError> {
        match self.node(superseded) {
            None => {
                return Err(DomainError::InternalConsistency(format!(
                    "superseded node {:?} is not part of the tree",
                    superseded
                )))
            }
            Some(node) if node.is_question() => {
                return Err(DomainError::InternalConsistency(format!(
                    "superseded node '{}' is a question, not an object",
                    node.value()
                )))
            }
            Some(_) => {}
        }

        let slot = match parent {
            None if superseded == self.root => None,
            None => {
                return Err(DomainError::InternalConsistency(
                    "no parent given but the superseded node is not the root".to_string(),
                ))
            }
            Some(parent) => {
                let branch = self.branch_of(parent, superseded).ok_or_else(|| {
                    DomainError::InternalConsistency(format!(
                        "superseded node {:?} is in neither slot of {:?}",
                        superseded, parent
                    ))
                })?;
                Some((parent, branch))
            }
        };

        let leaf = self.arena.insert(QuestionNode::answer(object));
        let (yes, no) = if yes_means_new_object {
            (leaf, superseded)
        } else {
            (superseded, leaf)
        };
        let question_id = self.arena.insert(QuestionNode::question(question, yes, no));

        match slot {
            None => self.root = question_id,
            Some((parent, branch)) => {
                if let Some(node) = self.arena.get_mut(parent) {
                    *node.slot_mut(branch) = Some(question_id);
                }
            }
        }
        debug!(
            "learned question {:?} (slot {:?}), tree now has {} nodes",
            question_id,
            slot.map(|(_, branch)| branch),
            self.node_count()
        );
        Ok(question_id)
    }

    /// Check the strict-binary invariant: questions have two live children, answers
    /// none, and every arena node is reached exactly once from the root.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut reached = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id).ok_or_else(|| {
                DomainError::InternalConsistency(format!("dangling node handle {:?}", id))
            })?;
            reached += 1;
            if reached > self.node_count() {
                return Err(DomainError::InternalConsistency(
                    "a node is reachable more than once".to_string(),
                ));
            }
            match (node.kind, node.yes, node.no) {
                (NodeKind::Question, Some(yes), Some(no)) => {
                    stack.push(no);
                    stack.push(yes);
                }
                (NodeKind::Answer, None, None) => {}
                (kind, _, _) => {
                    return Err(DomainError::InternalConsistency(format!(
                        "{} '{}' has the wrong number of children",
                        kind, node.value
                    )))
                }
            }
        }
        if reached != self.node_count() {
            return Err(DomainError::InternalConsistency(format!(
                "{} of {} nodes are unreachable from the root",
                self.node_count() - reached,
                self.node_count()
            )));
        }
        Ok(())
    }

    /// Document lines in pre-order, two per node: canonical tag, then value.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.node_count() * 2);
        for (_, node) in self.iter() {
            lines.push(node.kind.tag().to_string());
            lines.push(node.value.clone());
        }
        lines
    }

    /// Whole document as one newline-terminated string.
    pub fn to_document(&self) -> String {
        let mut document = String::new();
        for line in self.to_lines() {
            document.push_str(&line);
            document.push('\n');
        }
        document
    }

    /// Render for terminal display; children are labelled with the answer leading to them.
    ///
    /// Rendering stops after [`MAX_RENDER_DEPTH`] levels; a deeper question is shown
    /// with a single child counting the levels left out.
    pub fn to_termtree(&self) -> Tree<String> {
        fn build(tree: &QuestionTree, id: NodeId, label: String, level: usize) -> Tree<String> {
            let mut display = Tree::new(label);
            if level >= MAX_RENDER_DEPTH && tree.node(id).is_some_and(|n| n.is_question()) {
                display.push(Tree::new(format!(
                    "… {} more levels",
                    tree.depth_from(id) - 1
                )));
                return display;
            }
            for branch in [Branch::Yes, Branch::No] {
                if let Some(child) = tree.child(id, branch) {
                    if let Some(node) = tree.node(child) {
                        let label = format!("[{}] {}", branch, node.value());
                        display.push(build(tree, child, label, level + 1));
                    }
                }
            }
            display
        }

        match self.node(self.root) {
            Some(node) => build(self, self.root, node.value().to_string(), 1),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

/// Structural equality: same shape with the same kinds and values, regardless of handles.
///
/// A pre-order listing of a strict binary tree determines its shape, so comparing
/// the listings is enough.
impl PartialEq for QuestionTree {
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self
                .iter()
                .zip(other.iter())
                .all(|((_, a), (_, b))| a.kind == b.kind && a.value == b.value)
    }
}

impl Eq for QuestionTree {}

pub struct PreOrderIterator<'a> {
    tree: &'a QuestionTree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a QuestionTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a QuestionNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.node(current) {
                // No pushed first so the yes side pops first
                if let Some(no) = node.no {
                    self.stack.push(no);
                }
                if let Some(yes) = node.yes {
                    self.stack.push(yes);
                }
                return Some((current, node));
            }
        }
        None
    }
}

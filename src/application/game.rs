//! One round of twenty questions
//!
//! A round walks the tree from the root to a guess. A wrong guess asks the player
//! for their object and a distinguishing question, and the tree learns it.

use tracing::{debug, error, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{is_affirmative, Branch, DomainError, NodeId, QuestionTree};
use crate::infrastructure::traits::Console;

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The guess was right; the tree is unchanged.
    Won { object: String },
    /// The guess was wrong and the tree learned a new question.
    Learned { object: String, question: String },
    /// A broken tree invariant stopped the round; the tree is unchanged.
    Aborted { reason: String },
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Won { .. })
    }
}

#[derive(Debug)]
enum RoundState {
    AtQuestion {
        node: NodeId,
        parent: Option<NodeId>,
    },
    AtAnswer {
        node: NodeId,
        parent: Option<NodeId>,
    },
    Resolved(Outcome),
}

/// A single traversal from the root to a resolved state.
pub struct Round<'a, C: Console + ?Sized> {
    tree: &'a mut QuestionTree,
    console: &'a mut C,
}

impl<'a, C: Console + ?Sized> Round<'a, C> {
    pub fn new(tree: &'a mut QuestionTree, console: &'a mut C) -> Self {
        Self { tree, console }
    }

    /// Play until resolved. Fails with `EndOfInput` if the console runs dry.
    #[instrument(level = "debug", skip(self))]
    pub fn play(mut self) -> ApplicationResult<Outcome> {
        let mut state = self.visit(self.tree.root(), None);
        loop {
            state = match state {
                RoundState::AtQuestion { node, parent } => self.ask(node, parent)?,
                RoundState::AtAnswer { node, parent } => self.guess(node, parent)?,
                RoundState::Resolved(outcome) => {
                    info!("round resolved: {:?}", outcome);
                    return Ok(outcome);
                }
            };
        }
    }

    fn visit(&mut self, node: NodeId, parent: Option<NodeId>) -> RoundState {
        match self.tree.node(node) {
            Some(n) if n.is_question() => RoundState::AtQuestion { node, parent },
            Some(_) => RoundState::AtAnswer { node, parent },
            None => {
                error!("dangling node handle {:?} under {:?}", node, parent);
                self.console.write_line("There was some error.");
                RoundState::Resolved(Outcome::Aborted {
                    reason: format!("dangling node handle {:?}", node),
                })
            }
        }
    }

    fn ask(&mut self, node: NodeId, parent: Option<NodeId>) -> ApplicationResult<RoundState> {
        let Some(question) = self.tree.node(node).map(|n| n.value().to_string()) else {
            return Ok(self.visit(node, parent));
        };
        self.console.write(&format!("{} (y/n)? ", question));
        let branch = Branch::from_answer(&self.read("an answer to a question")?);
        debug!("'{}' -> {}", question, branch);

        match self.tree.child(node, branch) {
            Some(child) => Ok(self.visit(child, Some(node))),
            None => {
                error!("question '{}' has no {} branch", question, branch);
                self.console.write_line("There was some error.");
                Ok(RoundState::Resolved(Outcome::Aborted {
                    reason: format!("question '{}' has no {} branch", question, branch),
                }))
            }
        }
    }

    fn guess(&mut self, node: NodeId, parent: Option<NodeId>) -> ApplicationResult<RoundState> {
        let Some(name) = self.tree.node(node).map(|n| n.value().to_string()) else {
            return Ok(self.visit(node, parent));
        };
        self.console
            .write_line(&format!("I guess that your object is {}!", name));
        self.console.write("Am I right? (y/n)? ");
        if is_affirmative(&self.read("a confirmation of the guess")?) {
            self.console.write_line("Awesome! I win!");
            return Ok(RoundState::Resolved(Outcome::Won { object: name }));
        }

        self.console
            .write_line("Boo! I Lose.  Please help me get better!");
        self.console.write("What is your object? ");
        let object = self.read("the player's object")?.trim().to_string();
        self.console.write_line(&format!(
            "Please give me a yes/no question that distinguishes between {} and {}.",
            object, name
        ));
        self.console.write("Q: ");
        let question = self.read("a distinguishing question")?.trim().to_string();
        self.console
            .write(&format!("Is the answer \"yes\" for {}? (y/n)? ", object));
        let yes_means_new_object = is_affirmative(&self.read("the new question's answer")?);

        match self
            .tree
            .learn(parent, question.clone(), node, object.clone(), yes_means_new_object)
        {
            Ok(_) => Ok(RoundState::Resolved(Outcome::Learned { object, question })),
            Err(DomainError::InternalConsistency(reason)) => {
                error!("cannot learn '{}': {}", question, reason);
                self.console.write_line("There was an error with the tree.");
                Ok(RoundState::Resolved(Outcome::Aborted { reason }))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read(&mut self, context: &str) -> ApplicationResult<String> {
        self.console
            .read_line()
            .with_context(&format!("read {}", context))?
            .ok_or_else(|| ApplicationError::EndOfInput {
                context: context.to_string(),
            })
    }
}

/// Play one round against `console`, learning from a lost guess.
pub fn play_round<C: Console + ?Sized>(
    tree: &mut QuestionTree,
    console: &mut C,
) -> ApplicationResult<Outcome> {
    Round::new(tree, console).play()
}

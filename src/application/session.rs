//! A playing session: rounds until the player stops, with the tree saved as it learns.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::services::DocumentService;
use crate::application::{play_round, ApplicationError, ApplicationResult, IoResultExt, Outcome};
use crate::domain::{is_affirmative, QuestionTree};
use crate::infrastructure::traits::Console;

/// Tally of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub wins: usize,
    pub learned: usize,
}

impl SessionSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.rounds += 1;
        match outcome {
            Outcome::Won { .. } => self.wins += 1,
            Outcome::Learned { .. } => self.learned += 1,
            Outcome::Aborted { .. } => {}
        }
    }
}

/// Play rounds until the player declines another one or input ends.
///
/// The document at `path` is rewritten after every learned round, and once at the
/// end if it did not exist yet. Input ending mid-round discards that round.
#[instrument(level = "debug", skip(documents, tree, console))]
pub fn run_session<C: Console + ?Sized>(
    documents: &DocumentService,
    path: &Path,
    tree: &mut QuestionTree,
    console: &mut C,
) -> ApplicationResult<SessionSummary> {
    let mut summary = SessionSummary::default();
    loop {
        match play_round(tree, console) {
            Ok(outcome) => {
                summary.record(&outcome);
                if matches!(outcome, Outcome::Learned { .. }) {
                    documents.save(tree, Some(path))?;
                }
            }
            Err(ApplicationError::EndOfInput { context }) => {
                debug!("input ended while waiting for {}", context);
                console.write_line("");
                break;
            }
            Err(e) => return Err(e),
        }

        console.write("Do you want to play again (y/n)? ");
        match console.read_line().with_context("read play-again answer")? {
            Some(answer) if is_affirmative(&answer) => continue,
            _ => break,
        }
    }

    if !documents.exists(path) {
        documents.save(tree, Some(path))?;
    }
    debug!("session finished: {:?}", summary);
    Ok(summary)
}

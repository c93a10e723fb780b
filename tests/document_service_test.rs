//! Tests for DocumentService and playing sessions against real files

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use twentyq::application::services::DocumentService;
use twentyq::application::{run_session, ApplicationError, SessionSummary};
use twentyq::domain::{DomainError, QuestionTree, TagMatching};
use twentyq::infrastructure::traits::{RealFileSystem, ScriptedConsole};

/// Helper to create a question document for testing
fn create_document(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write question document");
    path
}

fn service(matching: TagMatching) -> DocumentService {
    DocumentService::new(Arc::new(RealFileSystem), matching)
}

// ============================================================
// Load
// ============================================================

#[test]
fn given_document_when_loading_then_returns_tree() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "questions.txt", "Q:\nHas fur?\nA:\nCat\nA:\nFish\n");

    let tree = service(TagMatching::Loose).load(&path).unwrap();

    assert_eq!(tree.objects(), ["Cat", "Fish"]);
}

#[test]
fn given_truncated_document_when_loading_then_malformed_document() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "questions.txt", "Q:\nHas fur?\nA:\nCat\n");

    let result = service(TagMatching::Loose).load(&path);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MalformedDocument { line: 5, .. }))
    ));
}

#[test]
fn given_loose_tags_when_loading_strict_then_malformed_document() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "questions.txt", "Question\nHas fur?\nA:\nCat\nA:\nFish\n");

    assert!(service(TagMatching::Loose).load(&path).is_ok());
    let result = service(TagMatching::Strict).load(&path);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MalformedDocument { line: 1, .. }))
    ));
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.txt");

    let err = service(TagMatching::Loose).load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("missing.txt"));
}

#[test]
fn given_missing_file_when_loading_or_seeding_then_single_object() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("questions.txt");

    let tree = service(TagMatching::Loose)
        .load_or_seed(&path, "computer")
        .unwrap();

    assert_eq!(tree, QuestionTree::from_object("computer"));
    assert!(!path.exists(), "seeding must not write the document");
}

// ============================================================
// Save
// ============================================================

#[test]
fn given_tree_when_saving_to_nested_path_then_creates_dirs_and_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("games").join("animals.txt");
    let mut tree = QuestionTree::from_object("Cat");
    let cat = tree.root();
    tree.learn(None, "Does it bark?", cat, "Dog", true).unwrap();
    let documents = service(TagMatching::Strict);

    documents.save(&tree, Some(&path)).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Q:\nDoes it bark?\nA:\nDog\nA:\nCat\n"
    );
    assert_eq!(documents.load(&path).unwrap(), tree);
}

#[test]
fn given_no_destination_when_saving_then_invalid_sink() {
    let tree = QuestionTree::from_object("Cat");

    let result = service(TagMatching::Loose).save(&tree, None);

    assert!(matches!(result, Err(ApplicationError::InvalidSink(_))));
}

#[test]
fn given_directory_destination_when_saving_then_invalid_sink() {
    let temp = TempDir::new().unwrap();
    let tree = QuestionTree::from_object("Cat");

    let result = service(TagMatching::Loose).save(&tree, Some(temp.path()));

    assert!(matches!(result, Err(ApplicationError::InvalidSink(_))));
}

// ============================================================
// Sessions
// ============================================================

#[test]
fn given_new_game_when_losing_then_winning_then_document_holds_learned_question() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("questions.txt");
    let documents = service(TagMatching::Loose);
    let mut tree = documents.load_or_seed(&path, "Cat").unwrap();
    let mut console = ScriptedConsole::new([
        // round 1: lose and teach Dog
        "n",
        "Dog",
        "Does it bark?",
        "y",
        "y",
        // round 2: win on Dog
        "y",
        "y",
        "n",
    ]);

    let summary = run_session(&documents, &path, &mut tree, &mut console).unwrap();

    assert_eq!(
        summary,
        SessionSummary {
            rounds: 2,
            wins: 1,
            learned: 1
        }
    );
    assert_eq!(documents.load(&path).unwrap(), tree);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Q:\nDoes it bark?\nA:\nDog\nA:\nCat\n"
    );
    assert_eq!(
        console.output().matches("Do you want to play again (y/n)? ").count(),
        2
    );
}

#[test]
fn given_input_ending_mid_round_when_playing_session_then_saves_seed_and_stops() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("questions.txt");
    let documents = service(TagMatching::Loose);
    let mut tree = documents.load_or_seed(&path, "Cat").unwrap();
    let mut console = ScriptedConsole::new(["n", "Dog"]);

    let summary = run_session(&documents, &path, &mut tree, &mut console).unwrap();

    assert_eq!(summary, SessionSummary::default());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "A:\nCat\n");
}

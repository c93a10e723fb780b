//! Tests for playing rounds against scripted answers

use rstest::rstest;

use twentyq::application::{play_round, ApplicationError, Outcome};
use twentyq::domain::{Branch, QuestionTree};
use twentyq::infrastructure::traits::ScriptedConsole;
use twentyq::util::testing;

fn animal_tree() -> QuestionTree {
    "Q:\nIs it an animal?\nQ:\nDoes it bark?\nA:\nDog\nA:\nCat\nA:\nRock\n"
        .parse()
        .expect("parse animal tree")
}

#[test]
fn given_cat_when_confirming_guess_then_wins_without_mutation() {
    testing::init_test_setup();
    let mut tree = QuestionTree::from_object("Cat");
    let mut console = ScriptedConsole::new(["yes"]);

    let outcome = play_round(&mut tree, &mut console).unwrap();

    assert!(outcome.is_win());
    assert_eq!(tree, QuestionTree::from_object("Cat"));
    assert_eq!(console.remaining(), 0);
}

#[test]
fn given_cat_when_losing_then_learns_dog_and_next_round_guesses_dog() {
    testing::init_test_setup();
    let mut tree = QuestionTree::from_object("Cat");

    // Round 1: wrong guess, teach Dog
    let mut console = ScriptedConsole::new(["n", "Dog", "Does it bark?", "y"]);
    let outcome = play_round(&mut tree, &mut console).unwrap();
    assert_eq!(
        outcome,
        Outcome::Learned {
            object: "Dog".into(),
            question: "Does it bark?".into()
        }
    );
    let root = tree.node(tree.root()).unwrap();
    assert!(root.is_question());
    assert_eq!(root.value(), "Does it bark?");
    let yes = tree.child(tree.root(), Branch::Yes).unwrap();
    let no = tree.child(tree.root(), Branch::No).unwrap();
    assert_eq!(tree.node(yes).unwrap().value(), "Dog");
    assert_eq!(tree.node(no).unwrap().value(), "Cat");

    // Round 2: yes to the question, yes to the guess
    let mut console = ScriptedConsole::new(["y", "y"]);
    let outcome = play_round(&mut tree, &mut console).unwrap();
    assert_eq!(
        outcome,
        Outcome::Won {
            object: "Dog".into()
        }
    );
    assert_eq!(
        console.output(),
        "Does it bark? (y/n)? I guess that your object is Dog!\nAm I right? (y/n)? Awesome! I win!\n"
    );
    assert_eq!(tree.node_count(), 3);
}

#[rstest]
#[case::yes_yes(&["y", "y", "y"], "Dog")]
#[case::yes_no(&["Y", "nope", "y"], "Cat")]
#[case::no(&["n", "y"], "Rock")]
#[case::garbage_means_no(&["maybe", "y"], "Rock")]
#[case::empty_means_no(&["", "y"], "Rock")]
fn given_answers_when_playing_then_guesses_expected_object(
    #[case] answers: &[&str],
    #[case] expected: &str,
) {
    let mut tree = animal_tree();
    let mut console = ScriptedConsole::new(answers.iter().copied());

    let outcome = play_round(&mut tree, &mut console).unwrap();

    assert_eq!(
        outcome,
        Outcome::Won {
            object: expected.to_string()
        }
    );
    assert!(console
        .output()
        .contains(&format!("I guess that your object is {}!", expected)));
}

#[test]
fn given_nested_leaf_when_losing_with_no_polarity_then_superseded_on_yes_side() {
    let mut tree = animal_tree();
    let mut console = ScriptedConsole::new([
        "y",
        "n",
        "n",
        "Hamster",
        "  Is it bigger than a bread box?  ",
        "no",
    ]);

    let outcome = play_round(&mut tree, &mut console).unwrap();

    assert!(matches!(outcome, Outcome::Learned { .. }));
    assert_eq!(
        tree.to_lines(),
        [
            "Q:",
            "Is it an animal?",
            "Q:",
            "Does it bark?",
            "A:",
            "Dog",
            "Q:",
            "Is it bigger than a bread box?",
            "A:",
            "Cat",
            "A:",
            "Hamster",
            "A:",
            "Rock",
        ]
    );
    assert!(console.output().contains(
        "Please give me a yes/no question that distinguishes between Hamster and Cat.\n"
    ));
    assert!(console
        .output()
        .ends_with("Q: Is the answer \"yes\" for Hamster? (y/n)? "));
    tree.validate().unwrap();
}

#[test]
fn given_no_answers_when_playing_then_end_of_input_and_tree_unchanged() {
    let mut tree = animal_tree();
    let before = tree.clone();
    let mut console = ScriptedConsole::new(Vec::<String>::new());

    let result = play_round(&mut tree, &mut console);

    assert!(matches!(result, Err(ApplicationError::EndOfInput { .. })));
    assert_eq!(tree, before);
    assert_eq!(console.output(), "Is it an animal? (y/n)? ");
}

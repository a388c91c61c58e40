//! End-to-end game flows against the engine and session.

use chrono::Utc;
use pretty_assertions::assert_eq;
use tq_core::entities::{AttributeMap, Entity};
use tq_engine::engine::AskedQuestion;
use tq_engine::{
    Answer, AnswerOutcome, AttributeQuestion, EngineError, GameSession, InformationEngine,
    MAX_GUESS_ATTEMPTS, Prompt, SessionStatus,
};

fn entity(id: i64, name: &str, attrs: &[(&str, &str)]) -> Entity {
    let now = Utc::now();
    Entity {
        id,
        name: name.into(),
        attributes: attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Some((*v).to_string())))
            .collect::<AttributeMap>(),
        created_at: now,
        updated_at: now,
    }
}

fn four() -> Vec<Entity> {
    vec![
        entity(1, "Alice", &[("hair", "brown"), ("glasses", "yes")]),
        entity(2, "Bob", &[("hair", "brown"), ("glasses", "no")]),
        entity(3, "Carol", &[("hair", "blond"), ("glasses", "yes")]),
        entity(4, "Dave", &[("hair", "blond"), ("glasses", "no")]),
    ]
}

fn truthful(target: &Entity, question: &AttributeQuestion) -> &'static str {
    if question.holds_for(target) { "yes" } else { "no" }
}

#[test]
fn scenario_a_two_candidates_one_bit() {
    let set = vec![
        entity(1, "Alice", &[("hair", "brown")]),
        entity(2, "Bob", &[("hair", "blond")]),
    ];
    let h = InformationEngine::entropy(&set);
    let gain = InformationEngine::information_gain(&set, &AttributeQuestion::new("hair", "brown"));
    assert!((h - 1.0).abs() < 1e-12);
    assert!((gain - 1.0).abs() < 1e-12);
}

#[test]
fn scenario_b_guesses_only_at_one_candidate() {
    let engine = InformationEngine::new(four()).unwrap();
    let target = engine.candidates()[3].clone();
    let mut session = GameSession::start(&engine).unwrap();

    let mut questions = 0;
    let guessed = loop {
        match session.next_step() {
            Prompt::Question(q) => {
                assert!(session.subset().len() > 1, "asked with a settled subset");
                questions += 1;
                let outcome = session.answer(truthful(&target, &q)).unwrap();
                assert!(matches!(outcome, AnswerOutcome::Accepted { .. }));
            }
            Prompt::Guess { entity, confidence, attempt } => {
                assert_eq!(session.subset().len(), 1);
                assert!((confidence - 1.0).abs() < f64::EPSILON);
                assert_eq!(attempt, 1);
                break entity;
            }
            other => panic!("unexpected prompt {other:?}"),
        }
    };

    assert_eq!(guessed.name, "Dave");
    assert_eq!(questions, 2);
    assert_eq!(session.confirm_guess(true).unwrap(), SessionStatus::Won);

    let record = session.record().expect("record");
    assert!(record.success);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.target_entity_id, Some(4));
    assert_eq!(record.trace.len(), 2);
    assert!(record.trace.iter().all(|t| t.user_value == "yes"));
    assert_eq!(session.next_step(), Prompt::Finished(SessionStatus::Won));
}

#[test]
fn scenario_c_three_misses_reach_learning() {
    let engine = InformationEngine::new(four()).unwrap();
    let mut session = GameSession::start(&engine).unwrap();

    loop {
        match session.next_step() {
            Prompt::Question(_) => {
                session.answer("no").unwrap();
            }
            Prompt::Guess { .. } => {
                session.confirm_guess(false).unwrap();
            }
            Prompt::IdentifyTarget => break,
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    assert_eq!(session.status(), SessionStatus::AwaitingLearning);
    assert_eq!(session.attempts(), MAX_GUESS_ATTEMPTS);
    assert!(session.record().is_none());
}

#[test]
fn single_candidate_pool_exhausts_after_one_miss() {
    let engine = InformationEngine::new(vec![entity(1, "Alice", &[])]).unwrap();
    let mut session = GameSession::start(&engine).unwrap();

    assert!(matches!(session.next_step(), Prompt::Guess { .. }));
    session.confirm_guess(false).unwrap();

    assert_eq!(session.next_step(), Prompt::IdentifyTarget);
    assert_eq!(session.attempts(), 1);
}

#[test]
fn wrong_guess_reseeds_from_least_contradicted() {
    let engine = InformationEngine::new(four()).unwrap();
    let target = engine.candidates()[1].clone(); // Bob
    let mut session = GameSession::start(&engine).unwrap();

    // Drive to the first guess answering for Bob, then reject it.
    loop {
        match session.next_step() {
            Prompt::Question(q) => {
                session.answer(truthful(&target, &q)).unwrap();
            }
            Prompt::Guess { entity, .. } => {
                assert_eq!(entity.name, "Bob");
                session.confirm_guess(false).unwrap();
                break;
            }
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    // Alice and Dave each contradict one answer; Carol contradicts two.
    match session.next_step() {
        Prompt::Question(_) | Prompt::Guess { .. } => {}
        other => panic!("unexpected prompt {other:?}"),
    }
    let names: Vec<&str> = session.subset().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Dave"]);
}

#[test]
fn unrecognized_reply_does_not_consume_a_turn() {
    let engine = InformationEngine::new(four()).unwrap();
    let mut session = GameSession::start(&engine).unwrap();
    let Prompt::Question(first) = session.next_step() else {
        panic!("expected a question");
    };

    let outcome = session.answer("perhaps").unwrap();

    assert_eq!(outcome, AnswerOutcome::Rejected { input: "perhaps".into() });
    assert_eq!(session.status(), SessionStatus::AwaitingAnswer);
    assert!(session.history().is_empty());
    assert_eq!(session.next_step(), Prompt::Question(first));
}

#[test]
fn operations_out_of_order_are_invalid_transitions() {
    let engine = InformationEngine::new(four()).unwrap();
    let mut session = GameSession::start(&engine).unwrap();

    assert!(matches!(
        session.answer("yes"),
        Err(EngineError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.confirm_guess(true),
        Err(EngineError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.identify_target("Zed", None),
        Err(EngineError::InvalidTransition { .. })
    ));
}

#[test]
fn start_on_empty_engine_fails() {
    let engine = InformationEngine::default();
    assert_eq!(GameSession::start(&engine).unwrap_err(), EngineError::EmptyDataset);
}

fn session_at_learning() -> GameSession {
    let engine = InformationEngine::new(vec![entity(1, "Alice", &[])]).unwrap();
    let mut session = GameSession::start(&engine).unwrap();
    session.next_step();
    session.confirm_guess(false).unwrap();
    assert_eq!(session.next_step(), Prompt::IdentifyTarget);
    session
}

#[test]
fn naming_a_known_entity_ends_missed() {
    let mut session = session_at_learning();
    let known = entity(1, "Alice", &[]);

    let status = session.identify_target("alice", Some(&known)).unwrap();

    assert_eq!(status, SessionStatus::Missed);
    let record = session.record().unwrap();
    assert_eq!(record.target_entity_id, Some(1));
    assert!(!record.success);
}

#[test]
fn naming_a_new_entity_then_learning() {
    let mut session = session_at_learning();

    session.identify_target("  Zed ", None).unwrap();
    assert_eq!(
        session.next_step(),
        Prompt::RegisterTarget { name: "Zed".into() }
    );

    let learned = entity(9, "Zed", &[("hair", "red")]);
    assert_eq!(session.complete_learning(&learned).unwrap(), SessionStatus::Learned);
    assert_eq!(session.record().unwrap().target_entity_id, Some(9));
}

#[test]
fn blank_target_name_is_invalid_input() {
    let mut session = session_at_learning();
    assert!(matches!(
        session.identify_target("  ", None),
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(session.status(), SessionStatus::AwaitingLearning);
}

#[test]
fn declining_registration_abandons_with_record() {
    let mut session = session_at_learning();
    session.identify_target("Zed", None).unwrap();

    assert_eq!(session.decline_registration().unwrap(), SessionStatus::Abandoned);
    let record = session.record().unwrap();
    assert_eq!(record.target_entity_id, None);
    assert_eq!(record.attempts, 1);
}

#[test]
fn abort_leaves_no_record() {
    let engine = InformationEngine::new(four()).unwrap();
    let mut session = GameSession::start(&engine).unwrap();
    session.next_step();

    session.abort();

    assert_eq!(session.status(), SessionStatus::Abandoned);
    assert!(session.record().is_none());
}

#[test]
fn question_sequence_is_deterministic() {
    let play = || {
        let engine = InformationEngine::new(four()).unwrap();
        let mut session = GameSession::start(&engine).unwrap();
        let mut asked = Vec::new();
        while let Prompt::Question(q) = session.next_step() {
            asked.push(q);
            session.answer("yes").unwrap();
        }
        asked
    };
    assert_eq!(play(), play());
}

#[test]
fn never_repeats_an_asked_pair() {
    let engine = InformationEngine::new(four()).unwrap();
    let mut session = GameSession::start(&engine).unwrap();
    let mut seen = std::collections::BTreeSet::new();
    loop {
        match session.next_step() {
            Prompt::Question(q) => {
                assert!(seen.insert(q.clone()), "{q:?} asked twice");
                session.answer("no").unwrap();
            }
            Prompt::Guess { .. } => {
                session.confirm_guess(false).unwrap();
            }
            _ => break,
        }
    }
}

#[test]
fn summary_tracks_progress() {
    let engine = InformationEngine::new(four()).unwrap();
    let mut session = GameSession::start(&engine).unwrap();
    session.next_step();
    session.answer("yes").unwrap();

    let summary = session.summary();
    assert_eq!(summary.questions_asked, 1);
    assert_eq!(summary.candidates_remaining, 2);
    assert_eq!(summary.attempts, 0);
    assert!((summary.confidence - 0.5).abs() < f64::EPSILON);
}

#[test]
fn asked_question_contradiction() {
    let alice = entity(1, "Alice", &[("hair", "brown")]);
    let asked = AskedQuestion {
        question: AttributeQuestion::new("hair", "brown"),
        answer: Answer::No,
    };
    assert!(asked.contradicted_by(&alice));
}

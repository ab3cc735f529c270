//! The `quizgate take` command.

use anyhow::Result;

use quizgate_core::gate::AccessGate;
use quizgate_core::model::UserIdentity;
use quizgate_core::scoring::{unanswered, AttemptScorer};
use quizgate_core::traits::AttemptStore;

use super::{parse_answers, GlobalOpts, Session};

pub fn execute(
    opts: &GlobalOpts,
    set_id: &str,
    email: &str,
    name: Option<&str>,
    raw_answers: &str,
) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(set_id)?;
    let user = UserIdentity::new(email, name);

    let history = session.store.list_by_set(&set.id)?;
    let mut gate = AccessGate::from_history(&set, &history, &user.email);
    gate.ensure_can_submit()?;

    let answers = parse_answers(raw_answers)?;
    let missing = unanswered(&set.questions, &answers);
    anyhow::ensure!(
        missing.is_empty(),
        "please answer all questions before submitting (missing: {})",
        missing.join(", ")
    );

    let scorer = AttemptScorer::new(&session.store);
    let result = scorer.score(
        &set.id,
        &set.questions,
        answers,
        gate.next_attempt_number(),
        &user,
    )?;
    let state = gate.record_attempt(&result)?;

    println!(
        "Attempt {} on {}: {}/{} correct ({:.1}%)",
        result.attempt_number,
        set.title,
        result.total_correct(),
        result.total_questions(),
        result.score_percent()
    );
    for area in set.areas() {
        if let Some(score) = result.area_scores.get(area) {
            println!("  {area}: {}/{}", score.correct, score.total);
        }
    }
    let mastered = result.mastered_areas();
    if !mastered.is_empty() {
        println!("Mastered: {}", mastered.join(", "));
    }

    if result.is_complete_success {
        println!("\nPassed! Run `quizgate review` to see explanations.");
    } else if gate.remaining_attempts() > 0 {
        println!("\nNot yet. {} attempt(s) left.", gate.remaining_attempts());
    } else {
        println!("\nNo attempts left. Ask your teacher for the review passcode.");
    }
    println!("State: {state}");

    Ok(())
}

//! Content seeded into an empty store.

use chrono::Utc;

use quizgate_core::model::{Question, QuizOption, QuizSet};

/// Id of the seeded quiz set.
pub const DEFAULT_SET_ID: &str = "default_set_1";

fn options(texts: [&str; 4]) -> Vec<QuizOption> {
    ["a", "b", "c", "d"]
        .into_iter()
        .zip(texts)
        .map(|(id, text)| QuizOption {
            id: id.to_string(),
            text: text.to_string(),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn question(
    id: &str,
    area: &str,
    text: &str,
    correct: &str,
    choices: [&str; 4],
    explanation: &str,
    hint: Option<&str>,
    translation: &str,
) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        options: options(choices),
        correct_option_id: correct.to_string(),
        area: area.to_string(),
        explanation: Some(explanation.to_string()),
        hint: hint.map(String::from),
        translation: Some(translation.to_string()),
    }
}

/// The proficiency set every fresh installation starts with.
pub fn default_quiz_set() -> QuizSet {
    QuizSet {
        id: DEFAULT_SET_ID.to_string(),
        title: "Standard English Proficiency".to_string(),
        description: "The classic assessment covering Grammar, Vocabulary, and Reading."
            .to_string(),
        questions: vec![
            question(
                "q1",
                "Grammar",
                "I _____ to the store yesterday when I saw him.",
                "b",
                ["go", "was going", "have gone", "will go"],
                "Use the past continuous \"was going\" to describe an action in progress at a specific time in the past.\n\nSince the action was interrupted by seeing him, the continuous form is required.",
                Some("Think about an action that was happening continuously in the past."),
                "昨日彼に会ったとき、私は店へ向かっている途中でした。",
            ),
            question(
                "q2",
                "Grammar",
                "She _____ play the piano since she was five.",
                "c",
                ["can", "is able to", "has been able to", "could"],
                "Use the present perfect \"has been able to\" because the action started in the past and continues to the present.",
                Some("The word \"since\" suggests an action starting in the past and continuing now."),
                "彼女は5歳の頃からピアノを弾くことができます。",
            ),
            question(
                "q3",
                "Vocabulary",
                "The meeting was _____ due to the storm.",
                "a",
                ["postponed", "expanded", "invited", "rejected"],
                "\"Postponed\" means to arrange for something to take place at a time later than that first scheduled.",
                Some("Which word means \"delayed\" or \"put off\"?"),
                "嵐のため、会議は延期されました。",
            ),
            question(
                "q4",
                "Vocabulary",
                "He made a _____ decision to quit his job.",
                "d",
                ["faint", "subtle", "vague", "bold"],
                "A \"bold\" decision involves taking risks and showing confidence.",
                Some("He showed courage by quitting."),
                "彼は仕事を辞めるという大胆な決断をしました。",
            ),
            question(
                "q5",
                "Reading",
                "Based on the context: \"The nocturnal creature emerged.\" When did this happen?",
                "b",
                ["At noon", "At night", "In the morning", "During lunch"],
                "\"Nocturnal\" refers to animals that are active at night.",
                None,
                "文脈に基づくと：「夜行性の生き物が現れた」。これはいつ起きましたか？",
            ),
        ],
        created_at: Utc::now(),
        created_by: "system".to_string(),
        passcode: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizgate_core::parser::validate_quiz_set;

    #[test]
    fn default_set_is_valid() {
        let set = default_quiz_set();
        assert!(validate_quiz_set(&set).is_empty());
        assert_eq!(set.areas(), vec!["Grammar", "Vocabulary", "Reading"]);
        let correct = set.question("q4").unwrap().correct_option().unwrap();
        assert_eq!(correct.text, "bold");
    }
}

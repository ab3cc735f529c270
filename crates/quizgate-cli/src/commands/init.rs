//! The `quizgate init` command.

use anyhow::Result;

use quizgate_insights::config::STARTER_CONFIG;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizgate.toml").exists() {
        println!("quizgate.toml already exists, skipping.");
    } else {
        std::fs::write("quizgate.toml", STARTER_CONFIG)?;
        println!("Created quizgate.toml");
    }

    std::fs::create_dir_all("quiz-sets")?;
    let example_path = std::path::Path::new("quiz-sets/example.toml");
    if example_path.exists() {
        println!("quiz-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ_SET)?;
        println!("Created quiz-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizgate.toml with your API keys");
    println!("  2. Run: quizgate validate --quiz-set quiz-sets/example.toml");
    println!("  3. Run: quizgate import --quiz-set quiz-sets/example.toml");
    println!("  4. Run: quizgate take --set example --email you@example.com --answers q1=b,q2=a");

    Ok(())
}

const EXAMPLE_QUIZ_SET: &str = r#"[quiz_set]
id = "example"
title = "Example Quiz"
description = "A two-question quiz to get started"
created_by = "tobita@kiryo.ac.jp"

[[questions]]
id = "q1"
area = "Grammar"
text = "She _____ to school every day."
correct = "b"
explanation = "Third person singular present takes -s: goes."
hint = "Who is the subject?"

[[questions.options]]
id = "a"
text = "go"

[[questions.options]]
id = "b"
text = "goes"

[[questions.options]]
id = "c"
text = "going"

[[questions]]
id = "q2"
area = "Vocabulary"
text = "Which word means 'very fast'?"
correct = "a"
explanation = "Rapid means happening quickly."

[[questions.options]]
id = "a"
text = "rapid"

[[questions.options]]
id = "b"
text = "tidy"

[[questions.options]]
id = "c"
text = "fragile"
"#;

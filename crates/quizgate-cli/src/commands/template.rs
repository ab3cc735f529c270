//! The `quizgate template` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    print!("{}", quizgate_core::parser::csv_template());
    Ok(())
}

//! The `quizgate reset` command.

use anyhow::Result;

use quizgate_core::traits::AttemptStore;

use super::{GlobalOpts, Session};

pub fn execute(opts: &GlobalOpts, yes: bool) -> Result<()> {
    anyhow::ensure!(
        yes,
        "reset deletes every attempt and cannot be undone; re-run with --yes to confirm"
    );

    let session = Session::open(opts)?;
    let count = session.store.list_all()?.len();
    session.store.clear_all()?;
    println!("Deleted {count} attempt(s).");
    Ok(())
}

//! The `quizgate admins` command.

use anyhow::Result;

use quizgate_core::admin::AdminWhitelist;
use quizgate_core::model::{UserIdentity, UserProfile};
use quizgate_core::traits::AdminStore;

use super::{GlobalOpts, Session};
use crate::AdminAction;

pub fn execute(opts: &GlobalOpts, action: AdminAction) -> Result<()> {
    let session = Session::open(opts)?;
    let root = session.config.root_admin.to_lowercase();

    match action {
        AdminAction::List => {
            for email in session.store.list()? {
                if email == root {
                    println!("{email} (root)");
                } else {
                    println!("{email}");
                }
            }
        }
        AdminAction::Add { email } => {
            session.store.add(&email)?;
            println!("Added admin {email}");
        }
        AdminAction::Remove { email } => {
            anyhow::ensure!(
                email.trim().to_lowercase() != root,
                "{email} is a protected admin and cannot be removed"
            );
            session.store.remove(&email)?;
            println!("Removed admin {email}");
        }
    }
    Ok(())
}

pub fn whoami(opts: &GlobalOpts, email: &str, name: Option<&str>) -> Result<()> {
    let session = Session::open(opts)?;
    let root = &session.config.root_admin;
    let whitelist = AdminWhitelist::from_members(root, session.store.list()?);

    let UserProfile { identity, role } = whitelist.resolve(UserIdentity::new(email, name));
    println!("{} <{}>: {role}", identity.display_name, identity.email);
    Ok(())
}
